//! Static response tables: intent label -> reply, menu item -> product fragment.
//!
//! Both tables are closed enums so every entry is enumerable and tested. Intent
//! labels coming from the classifier stay open strings; anything unmapped lands
//! on [`IntentTemplate::None`].

/// Intent label the classifier emits for "place an order".
pub const PLACE_ORDER_INTENT: &str = "RealizarPedido";

/// Appended to entity replies when the intent is [`PLACE_ORDER_INTENT`].
pub const ORDER_CALL_TO_ACTION: &str = "\n\n📞 Para completar tu pedido llámanos al (123) 456-7890 o escríbenos por WhatsApp al (123) 456-7890. ¡Con gusto lo preparamos!";

/// Intent templates. `None` is the unknown-intent default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentTemplate {
    MenuInfo,
    Horarios,
    Reservacion,
    Ubicacion,
    Precios,
    RealizarPedido,
    None,
}

impl IntentTemplate {
    pub const ALL: [IntentTemplate; 7] = [
        IntentTemplate::MenuInfo,
        IntentTemplate::Horarios,
        IntentTemplate::Reservacion,
        IntentTemplate::Ubicacion,
        IntentTemplate::Precios,
        IntentTemplate::RealizarPedido,
        IntentTemplate::None,
    ];

    /// Classifier label for this entry. Exact, case-sensitive match.
    pub fn label(&self) -> &'static str {
        match self {
            IntentTemplate::MenuInfo => "MenuInfo",
            IntentTemplate::Horarios => "Horarios",
            IntentTemplate::Reservacion => "Reservacion",
            IntentTemplate::Ubicacion => "Ubicacion",
            IntentTemplate::Precios => "Precios",
            IntentTemplate::RealizarPedido => PLACE_ORDER_INTENT,
            IntentTemplate::None => "None",
        }
    }

    /// Exact-key lookup; absent, empty or unknown labels map to `None`.
    pub fn from_label(label: Option<&str>) -> Self {
        let Some(label) = label else {
            return IntentTemplate::None;
        };
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.label() == label)
            .unwrap_or(IntentTemplate::None)
    }

    pub fn text(&self) -> &'static str {
        match self {
            IntentTemplate::MenuInfo => "Nuestro menú incluye:\n- Entradas: Ensalada César, Bruschetta, Sopa del día\n- Platos principales: Pizza artesanal, Pasta Alfredo, Hamburguesa de la casa, Salmón a la parrilla\n- Postres: Tiramisú, Cheesecake, Helado artesanal\n\n¿Te gustaría saber más sobre algún platillo?",
            IntentTemplate::Horarios => "Estamos abiertos de lunes a domingo:\n- Lunes a viernes: 12:00 PM - 11:00 PM\n- Sábados y domingos: 11:00 AM - 12:00 AM",
            IntentTemplate::Reservacion => "Para hacer una reservación, por favor llama al (123) 456-7890 o envíanos un email a reservas@restaurante.com. ¿Para cuántas personas y qué fecha?",
            IntentTemplate::Ubicacion => "Nos encontramos en Av. Principal 123, Centro, Ciudad. Tenemos estacionamiento gratuito y acceso para sillas de ruedas.",
            IntentTemplate::Precios => "Nuestros precios:\n- Entradas: $80 - $150\n- Platos principales: $200 - $450\n- Postres: $80 - $120\n\nMenú del día de lunes a viernes por $180.",
            IntentTemplate::RealizarPedido => "¡Con gusto tomamos tu pedido! ¿Qué platillo te gustaría ordenar? Tenemos pizza, pasta, hamburguesas, ensaladas y postres.",
            IntentTemplate::None => "Puedo ayudarte con información sobre nuestro menú, horarios, reservaciones, ubicación o precios. ¿Qué te gustaría saber?",
        }
    }
}

/// Product fragments keyed by normalized (trimmed, lower-cased) entity text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItemTemplate {
    Pizza,
    Pasta,
    Hamburguesa,
    Ensalada,
    Salmon,
    Postre,
    Bebida,
}

impl MenuItemTemplate {
    pub const ALL: [MenuItemTemplate; 7] = [
        MenuItemTemplate::Pizza,
        MenuItemTemplate::Pasta,
        MenuItemTemplate::Hamburguesa,
        MenuItemTemplate::Ensalada,
        MenuItemTemplate::Salmon,
        MenuItemTemplate::Postre,
        MenuItemTemplate::Bebida,
    ];

    /// Normalized keys accepted for each item, singular and plural.
    pub fn keys(&self) -> &'static [&'static str] {
        match self {
            MenuItemTemplate::Pizza => &["pizza", "pizzas"],
            MenuItemTemplate::Pasta => &["pasta", "pastas"],
            MenuItemTemplate::Hamburguesa => &["hamburguesa", "hamburguesas"],
            MenuItemTemplate::Ensalada => &["ensalada", "ensaladas"],
            MenuItemTemplate::Salmon => &["salmón", "salmon"],
            MenuItemTemplate::Postre => &["postre", "postres"],
            MenuItemTemplate::Bebida => &["bebida", "bebidas"],
        }
    }

    /// Lookup by raw entity text; trims and lower-cases before matching.
    pub fn lookup(entity_text: &str) -> Option<Self> {
        let key = normalize_entity_text(entity_text);
        Self::ALL
            .iter()
            .copied()
            .find(|item| item.keys().contains(&key.as_str()))
    }

    pub fn fragment(&self) -> &'static str {
        match self {
            MenuItemTemplate::Pizza => "🍕 Nuestras pizzas artesanales:\n- Margarita: $180\n- Pepperoni: $200\n- Hawaiana: $210\n- Cuatro quesos: $230",
            MenuItemTemplate::Pasta => "🍝 Nuestras pastas:\n- Alfredo: $190\n- Boloñesa: $200\n- Carbonara: $210",
            MenuItemTemplate::Hamburguesa => "🍔 Nuestras hamburguesas:\n- Clásica: $160\n- De la casa con tocino: $190\n- Vegetariana: $170",
            MenuItemTemplate::Ensalada => "🥗 Nuestras ensaladas:\n- César: $120\n- Caprese: $130\n- Mediterránea: $140",
            MenuItemTemplate::Salmon => "🐟 Salmón a la parrilla con verduras asadas y arroz: $350",
            MenuItemTemplate::Postre => "🍰 Nuestros postres:\n- Tiramisú: $95\n- Cheesecake: $90\n- Helado artesanal: $80",
            MenuItemTemplate::Bebida => "🥤 Nuestras bebidas:\n- Aguas frescas: $45\n- Refrescos: $40\n- Limonada mineral: $50",
        }
    }
}

/// Entity text normalization shared by lookup and callers.
pub fn normalize_entity_text(text: &str) -> String {
    text.trim().to_lowercase()
}
