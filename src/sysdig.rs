use serde::{Deserialize, Deserializer};

/// Webhook notification as posted by Sysdig Monitor.
///
/// Missing and `null` fields decode to their zero value, so a payload carrying
/// only `alert.body` and `customData.webhook` is accepted.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Notification {
    #[serde(deserialize_with = "null_default")]
    pub alert: Alert,
    #[serde(deserialize_with = "null_default")]
    pub event: Event,
    #[serde(deserialize_with = "null_default")]
    pub condition: String,
    #[serde(deserialize_with = "null_default")]
    pub source: String,
    #[serde(deserialize_with = "null_default")]
    pub state: String,
    #[serde(deserialize_with = "null_default")]
    pub timestamp: i64,
    #[serde(deserialize_with = "null_default")]
    pub timespan: i64,
    #[serde(deserialize_with = "null_default")]
    pub entities: Vec<Entity>,
    #[serde(rename = "customData", deserialize_with = "null_default")]
    pub custom_data: CustomData,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Alert {
    #[serde(deserialize_with = "null_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_default")]
    pub name: String,
    #[serde(deserialize_with = "null_default")]
    pub description: String,
    #[serde(deserialize_with = "null_default")]
    pub scope: String,
    #[serde(deserialize_with = "null_default")]
    pub severity: i64,
    #[serde(rename = "severityLabel", deserialize_with = "null_default")]
    pub severity_label: String,
    #[serde(rename = "editUrl", deserialize_with = "null_default")]
    pub edit_url: String,
    #[serde(deserialize_with = "null_default")]
    pub subject: String,
    #[serde(deserialize_with = "null_default")]
    pub body: String,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Event {
    #[serde(deserialize_with = "null_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_default")]
    pub url: String,
    #[serde(deserialize_with = "null_default")]
    pub username: String,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Entity {
    #[serde(deserialize_with = "null_default")]
    pub entity: String,
    #[serde(rename = "metricValues", deserialize_with = "null_default")]
    pub metric_values: Vec<MetricValue>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct MetricValue {
    #[serde(deserialize_with = "null_default")]
    pub metric: String,
    #[serde(deserialize_with = "null_default")]
    pub aggregation: String,
    #[serde(rename = "groupAggregation", deserialize_with = "null_default")]
    pub group_aggregation: String,
    #[serde(deserialize_with = "null_default")]
    pub value: f64,
}

/// Free-form data attached to the Sysdig notification channel.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct CustomData {
    /// Feishu bot webhook the card is relayed to
    #[serde(deserialize_with = "null_default")]
    pub webhook: String,
}

/// Decode `null` as the type's zero value
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Notification {
    /// Parse a raw request body. Anything after the first JSON value is ignored.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        match serde_json::Deserializer::from_slice(body)
            .into_iter::<Self>()
            .next()
        {
            Some(notification) => notification,
            // Nothing but whitespace, let the strict parser name the error
            None => serde_json::from_slice(body),
        }
    }

    /// Destination webhook, if one was supplied
    pub fn webhook(&self) -> Option<&str> {
        match self.custom_data.webhook.as_str() {
            "" => None,
            url => Some(url),
        }
    }
}
