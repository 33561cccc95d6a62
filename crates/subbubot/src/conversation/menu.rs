//! Service menu, reply texts, and input matching.

use subbubot_protocol::InteractiveMessage;

/// Substrings that (re)start the welcome flow. Matching is not whole-word,
/// so "this" and "they" count as greetings too.
pub const GREETINGS: [&str; 3] = ["hi", "hello", "hey"];

pub const MENU_BODY: &str = "Welcome to SubbuBot! Please select a service:";

/// Plain-text menu used when the interactive menu cannot be sent.
pub const WELCOME_TEXT_MENU: &str = "✨ Welcome to SubbuBot! ✨\n\n\
    Please select the specific service:\n\
    1️⃣  Car wash\n\
    2️⃣  Painting\n\
    3️⃣  💡 LED";

pub const REPROMPT_TEXT: &str = "Please reply with 1, 2, or 3 to select a service.";

pub const ACKNOWLEDGEMENT_TEXT: &str = "Thanks for updating";

/// Whether `text` contains a greeting, ignoring case.
pub fn is_greeting(text: &str) -> bool {
    let lower = text.to_lowercase();
    GREETINGS.iter().any(|greeting| lower.contains(greeting))
}

/// A service offered in the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    CarWash,
    Painting,
    Led,
}

impl Service {
    /// Menu order.
    pub const ALL: [Service; 3] = [Service::CarWash, Service::Painting, Service::Led];

    pub fn number(self) -> u8 {
        match self {
            Service::CarWash => 1,
            Service::Painting => 2,
            Service::Led => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Service::CarWash => "Car wash",
            Service::Painting => "Painting",
            Service::Led => "LED",
        }
    }

    /// Id of the reply button for this service.
    pub fn reply_id(self) -> &'static str {
        match self {
            Service::CarWash => "service_car_wash",
            Service::Painting => "service_painting",
            Service::Led => "service_led",
        }
    }

    /// Button title, e.g. `"1. Car wash"`.
    pub fn title(self) -> &'static str {
        match self {
            Service::CarWash => "1. Car wash",
            Service::Painting => "2. Painting",
            Service::Led => "3. LED",
        }
    }

    pub fn confirmation(self) -> &'static str {
        match self {
            Service::CarWash => "You selected: Car wash. We'll contact you shortly.",
            Service::Painting => "You selected: Painting. We'll share options soon.",
            Service::Led => "You selected: LED. We'll share packages soon.",
        }
    }

    /// Resolve a menu choice: the number, the button title, the bare label,
    /// or the reply id. Case and surrounding whitespace are ignored.
    pub fn from_choice(choice: &str) -> Option<Self> {
        let choice = choice.trim().to_lowercase();
        Self::ALL.into_iter().find(|service| {
            choice == service.number().to_string()
                || choice == service.title().to_lowercase()
                || choice == service.label().to_lowercase()
                || choice == service.reply_id()
        })
    }
}

/// Interactive menu with one reply button per service.
pub fn service_menu() -> InteractiveMessage {
    InteractiveMessage::reply_buttons(
        MENU_BODY,
        Service::ALL.map(|service| (service.reply_id(), service.title())),
    )
}
