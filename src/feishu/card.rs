use crate::sysdig::Alert;
use serde::Serialize;

const RECEIVE_ID: &str = "all";
const MSG_TYPE: &str = "interactive";
const TITLE_TAG: &str = "lark_md";
const TITLE: &str = "cloud moniter alert";
const ELEMENT_TAG: &str = "markdown";

/// Interactive card message accepted by a Feishu custom bot webhook
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub receive_id: String,
    pub msg_type: String,
    pub card: Card,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Card {
    pub header: Header,
    pub i18n_elements: I18nElements,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Header {
    pub title: Title,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Title {
    pub tag: String,
    pub i18n: I18nText,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct I18nText {
    pub en_us: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct I18nElements {
    pub en_us: Vec<Element>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub content: String,
}

impl Message {
    /// The fixed card every alert is rendered into, with empty markdown content
    pub fn template() -> Self {
        Self {
            receive_id: RECEIVE_ID.to_string(),
            msg_type: MSG_TYPE.to_string(),
            card: Card {
                header: Header {
                    title: Title {
                        tag: TITLE_TAG.to_string(),
                        i18n: I18nText {
                            en_us: TITLE.to_string(),
                        },
                    },
                },
                i18n_elements: I18nElements {
                    en_us: vec![Element {
                        tag: ELEMENT_TAG.to_string(),
                        content: String::new(),
                    }],
                },
            },
        }
    }

    /// Render a Sysdig alert: the alert body becomes the card's markdown content, verbatim
    pub fn from_alert(alert: &Alert) -> Self {
        let mut message = Self::template();

        for element in message.card.i18n_elements.en_us.iter_mut() {
            element.content = alert.body.clone();
        }

        message
    }

    /// Markdown content of the card
    pub fn content(&self) -> &str {
        self.card
            .i18n_elements
            .en_us
            .first()
            .map(|element| element.content.as_str())
            .unwrap_or_default()
    }
}
