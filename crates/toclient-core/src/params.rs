//! Query filters for list endpoints.

use url::form_urlencoded;

/// Which objects a list endpoint should return.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selector {
    #[default]
    All,
    Id(u64),
    Name(String),
    /// Arbitrary `key=value` filters, encoded in order.
    Params(Vec<(String, String)>),
}

impl Selector {
    pub fn id(id: u64) -> Self {
        Selector::Id(id)
    }

    pub fn name(name: impl Into<String>) -> Self {
        Selector::Name(name.into())
    }

    pub fn params<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Selector::Params(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Encoded query string without the leading `?`; empty for `All`.
    pub fn query(&self) -> String {
        let mut q = form_urlencoded::Serializer::new(String::new());
        match self {
            Selector::All => {}
            Selector::Id(id) => {
                q.append_pair("id", &id.to_string());
            }
            Selector::Name(name) => {
                q.append_pair("name", name);
            }
            Selector::Params(pairs) => {
                for (k, v) in pairs {
                    q.append_pair(k, v);
                }
            }
        }
        q.finish()
    }

    /// Append the query to a logical path, respecting an existing `?`.
    pub fn apply(&self, path: &str) -> String {
        let query = self.query();
        if query.is_empty() {
            return path.to_string();
        }
        let sep = if path.contains('?') { '&' } else { '?' };
        format!("{}{}{}", path, sep, query)
    }
}

impl From<u64> for Selector {
    fn from(id: u64) -> Self {
        Selector::Id(id)
    }
}

impl From<&str> for Selector {
    fn from(name: &str) -> Self {
        Selector::Name(name.to_string())
    }
}
