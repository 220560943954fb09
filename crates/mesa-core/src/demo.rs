//! Demo responder: local keyword matching with canned replies. No network.

/// Keyword group: any phrase hit selects the reply. Groups are checked in order.
struct KeywordGroup {
    topic: &'static str,
    phrases: &'static [&'static str],
    reply: &'static str,
}

const MENU_REPLY: &str = "Nuestro menú incluye:\n- Entradas: Ensalada César, Bruschetta, Sopa del día\n- Platos principales: Pasta Alfredo, Salmón a la parrilla, Filete de res\n- Postres: Tiramisú, Cheesecake, Helado artesanal\n\n¿Te gustaría más detalles sobre algún platillo?";

const HOURS_REPLY: &str = "Nuestro horario es:\n• Lunes a viernes: 12:00 PM - 11:00 PM\n• Sábados y domingos: 11:00 AM - 12:00 AM\n\n¡Te esperamos!";

const RESERVATION_REPLY: &str = "Para hacer una reservación puedes:\n• Llamar al: (123) 456-7890\n• Email: reservas@restaurante.com\n• WhatsApp: (123) 456-7890\n\n¿Para cuántas personas necesitas la mesa?";

const LOCATION_REPLY: &str = "Nos encontramos en:\n📍 Av. Principal 123, Centro\nCiudad, CP 12345\n\nContamos con:\n• Estacionamiento gratuito\n• Acceso para sillas de ruedas\n• Zona de terraza";

const PRICE_REPLY: &str = "Nuestros precios varían:\n• Entradas: $80 - $150\n• Platos principales: $200 - $450\n• Postres: $80 - $120\n\nContamos con menú del día de lunes a viernes por $180.";

/// Reply when no keyword group matches.
pub const DEMO_HELP_REPLY: &str = "Puedo ayudarte con:\n• Información del menú\n• Horarios de atención\n• Realizar reservaciones\n• Ubicación y contacto\n• Precios\n\n¿Qué necesitas saber?";

const KEYWORD_GROUPS: &[KeywordGroup] = &[
    KeywordGroup {
        topic: "menu",
        phrases: &["menú", "menu", "comida"],
        reply: MENU_REPLY,
    },
    KeywordGroup {
        topic: "hours",
        phrases: &["hora", "abierto", "horario"],
        reply: HOURS_REPLY,
    },
    KeywordGroup {
        topic: "reservation",
        phrases: &["reserva", "reservación"],
        reply: RESERVATION_REPLY,
    },
    KeywordGroup {
        topic: "location",
        phrases: &["ubicación", "ubicacion", "dirección", "donde"],
        reply: LOCATION_REPLY,
    },
    KeywordGroup {
        topic: "price",
        phrases: &["precio", "costo"],
        reply: PRICE_REPLY,
    },
];

/// Resolve an utterance to a canned reply. Total and deterministic; first group wins.
pub fn resolve(utterance: &str) -> &'static str {
    let lower = utterance.to_lowercase();
    KEYWORD_GROUPS
        .iter()
        .find(|g| g.phrases.iter().any(|p| lower.contains(p)))
        .map(|g| {
            tracing::debug!("[MESA] Demo topic matched: {}", g.topic);
            g.reply
        })
        .unwrap_or(DEMO_HELP_REPLY)
}
