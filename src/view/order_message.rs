use url::Url;

use crate::models::cart_item::CartItem;

pub const DEFAULT_MESSAGING_URL: &str = "https://wa.me";
pub const DEFAULT_RECIPIENT: &str = "5214421234567";

/// Fixed text around the itemized order lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTemplate {
    pub header: String,
    pub total_label: String,
}

impl Default for OrderTemplate {
    fn default() -> Self {
        Self {
            header: "¡Hola! Me gustaría hacer el siguiente pedido:".to_string(),
            total_label: "📦 Total de productos:".to_string(),
        }
    }
}

/// Where order messages are sent: `{base_url}/{recipient}?text=...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagingTarget {
    pub base_url: Url,
    pub recipient: String,
}

impl MessagingTarget {
    pub fn new(base_url: Url, recipient: impl Into<String>) -> Self {
        Self {
            base_url,
            recipient: recipient.into(),
        }
    }

    pub fn link_for(&self, message: &str) -> String {
        format!(
            "{}/{}?text={}",
            self.base_url.as_str().trim_end_matches('/'),
            self.recipient,
            urlencoding::encode(message)
        )
    }
}

impl Default for MessagingTarget {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_MESSAGING_URL).expect("default messaging URL is valid"),
            recipient: DEFAULT_RECIPIENT.to_string(),
        }
    }
}

/// Itemized, human readable order text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderMessage {
    text: String,
    total_items: u64,
}

impl OrderMessage {
    /// Builds the message, or `None` when there is nothing to order.
    pub fn build(template: &OrderTemplate, items: &[CartItem]) -> Option<Self> {
        if items.is_empty() {
            return None;
        }

        let total_items: u64 = items.iter().map(|item| u64::from(item.quantity)).sum();

        let mut text = format!("{}\n\n", template.header);
        for (index, item) in items.iter().enumerate() {
            text.push_str(&format!("{}. {} x{}\n", index + 1, item.name, item.quantity));
        }
        text.push_str(&format!("\n{} {}", template.total_label, total_items));

        Some(Self { text, total_items })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    pub fn link(&self, target: &MessagingTarget) -> String {
        target.link_for(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;

    fn line(name: &str, quantity: u32) -> CartItem {
        CartItem {
            id: name.to_lowercase(),
            name: name.to_string(),
            image_src: String::new(),
            price: BigDecimal::from(1),
            quantity,
        }
    }

    #[test]
    fn test_empty_cart_has_no_message() {
        assert!(OrderMessage::build(&OrderTemplate::default(), &[]).is_none());
    }

    #[test]
    fn test_message_format() {
        let items = vec![line("Miel", 2), line("Pan", 1)];
        let message = OrderMessage::build(&OrderTemplate::default(), &items).unwrap();

        assert_eq!(
            message.text(),
            "¡Hola! Me gustaría hacer el siguiente pedido:\n\n\
             1. Miel x2\n\
             2. Pan x1\n\
             \n📦 Total de productos: 3"
        );
        assert_eq!(message.total_items(), 3);
    }

    #[test]
    fn test_link_is_percent_encoded() {
        let template = OrderTemplate {
            header: "Hi".to_string(),
            total_label: "Total:".to_string(),
        };
        let message = OrderMessage::build(&template, &[line("Big Box", 1)]).unwrap();
        let link = message.link(&MessagingTarget::default());

        assert_eq!(
            link,
            "https://wa.me/5214421234567?text=Hi%0A%0A1.%20Big%20Box%20x1%0A%0ATotal%3A%201"
        );
    }

    #[test]
    fn test_link_trims_trailing_slash() {
        let target = MessagingTarget::new(Url::parse("https://chat.example.com/send/").unwrap(), "42");
        assert_eq!(target.link_for("a b"), "https://chat.example.com/send/42?text=a%20b");
    }
}
