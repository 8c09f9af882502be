use serde_json::Value;

pub const CAST_CREATED: &str = "cast.created";

/// Webhook envelope. Fields are read off the raw JSON so that any well-formed
/// body gets an answer, whatever shape the sender used.
#[derive(Debug, Clone, Copy)]
pub struct InboundEvent<'a> {
    pub event_type: &'a Value,
    pub data: &'a Value,
}

impl<'a> InboundEvent<'a> {
    /// Type and data, when both are present and non-blank. A body that is not
    /// an object has neither.
    pub fn from_body(body: &'a Value) -> Option<Self> {
        let event_type = body.get("type").filter(|t| !is_blank(t))?;
        let data = body.get("data").filter(|d| !is_blank(d))?;
        Some(Self { event_type, data })
    }

    pub fn is_cast_created(&self) -> bool {
        self.event_type.as_str() == Some(CAST_CREATED)
    }
}

/// null, false, 0 and "" count as absent
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[derive(Debug, Clone, Default)]
pub struct Cast {
    pub hash: Option<String>,
    pub text: Option<String>,
    pub author: Option<CastAuthor>,
    pub parent_author: Option<ParentAuthor>,
}

#[derive(Debug, Clone, Default)]
pub struct CastAuthor {
    pub fid: Option<u64>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ParentAuthor {
    pub fid: Option<u64>,
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Lenient read: anything missing or of the wrong type is treated as absent,
/// so non-object data is simply a cast with no author and no text.
impl From<&Value> for Cast {
    fn from(data: &Value) -> Self {
        Self {
            hash: str_field(data, "hash"),
            text: str_field(data, "text"),
            author: data.get("author").filter(|a| a.is_object()).map(|a| CastAuthor {
                fid: a.get("fid").and_then(Value::as_u64),
                username: str_field(a, "username"),
            }),
            parent_author: data
                .get("parent_author")
                .filter(|p| p.is_object())
                .map(|p| ParentAuthor {
                    fid: p.get("fid").and_then(Value::as_u64),
                }),
        }
    }
}

impl Cast {
    pub fn author_fid(&self) -> Option<u64> {
        self.author.as_ref().and_then(|a| a.fid)
    }

    pub fn parent_author_fid(&self) -> Option<u64> {
        self.parent_author.as_ref().and_then(|p| p.fid)
    }

    pub fn username(&self) -> &str {
        self.author
            .as_ref()
            .and_then(|a| a.username.as_deref())
            .unwrap_or("anon")
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Case-insensitive substring match on the handle token
    pub fn mentions(&self, handle: &str) -> bool {
        self.text().to_lowercase().contains(&handle.to_lowercase())
    }
}
