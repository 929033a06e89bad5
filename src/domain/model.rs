use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Declared body format of a response, taken from its `content-type` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentKind {
    Json,
    Xml,
    PlainText,
}

impl ContentKind {
    pub fn from_content_type(header: Option<&str>) -> Self {
        match header.map(|h| h.to_ascii_lowercase()) {
            Some(h) if h.contains("json") => ContentKind::Json,
            Some(h) if h.contains("xml") => ContentKind::Xml,
            _ => ContentKind::PlainText,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Json => "json",
            ContentKind::Xml => "xml",
            ContentKind::PlainText => "plain-text",
        }
    }
}

/// Body of a single response. Lives only until it has been parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPayload {
    pub kind: ContentKind,
    pub body: String,
}

impl RawPayload {
    pub fn new(kind: ContentKind, body: impl Into<String>) -> Self {
        Self {
            kind,
            body: body.into(),
        }
    }

    pub fn json(body: impl Into<String>) -> Self {
        Self::new(ContentKind::Json, body)
    }

    pub fn xml(body: impl Into<String>) -> Self {
        Self::new(ContentKind::Xml, body)
    }

    pub fn plain_text(body: impl Into<String>) -> Self {
        Self::new(ContentKind::PlainText, body)
    }
}

/// Field name to scalar text for one API entity (legislator, summary, sector, contributor).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeNode {
    fields: BTreeMap<String, String>,
}

impl AttributeNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn raw(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AttributeNode {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Zero or more entities of one kind, in the order the API returned them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordList(Vec<AttributeNode>);

impl RecordList {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn singleton(node: AttributeNode) -> Self {
        Self(vec![node])
    }

    pub fn as_slice(&self) -> &[AttributeNode] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AttributeNode> {
        self.0.iter()
    }

    pub fn first(&self) -> Option<&AttributeNode> {
        self.0.first()
    }
}

impl From<Vec<AttributeNode>> for RecordList {
    fn from(nodes: Vec<AttributeNode>) -> Self {
        Self(nodes)
    }
}

impl FromIterator<AttributeNode> for RecordList {
    fn from_iter<I: IntoIterator<Item = AttributeNode>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for RecordList {
    type Item = AttributeNode;
    type IntoIter = std::vec::IntoIter<AttributeNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a RecordList {
    type Item = &'a AttributeNode;
    type IntoIter = std::slice::Iter<'a, AttributeNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// What the parser found at an entity path: one bare entity or a repeated one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Node(AttributeNode),
    List(RecordList),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub name: String,
    pub value: u64,
}

/// Presentational amount. Never parsed back into a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DisplayAmount {
    Grouped(String),
    Unavailable,
}

impl DisplayAmount {
    pub const UNAVAILABLE: &'static str = "N/A";

    pub fn is_available(&self) -> bool {
        matches!(self, DisplayAmount::Grouped(_))
    }

    /// Dollar-prefixed form, e.g. `$1,234` or `-$50`; the unavailable marker is left bare.
    pub fn currency(&self) -> String {
        match self {
            DisplayAmount::Grouped(text) => match text.strip_prefix('-') {
                Some(rest) => format!("-${}", rest),
                None => format!("${}", text),
            },
            DisplayAmount::Unavailable => Self::UNAVAILABLE.to_string(),
        }
    }
}

impl fmt::Display for DisplayAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayAmount::Grouped(text) => f.write_str(text),
            DisplayAmount::Unavailable => f.write_str(Self::UNAVAILABLE),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiMethod {
    GetLegislators,
    CandSummary,
    CandSector,
    CandContrib,
}

impl ApiMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiMethod::GetLegislators => "getLegislators",
            ApiMethod::CandSummary => "candSummary",
            ApiMethod::CandSector => "candSector",
            ApiMethod::CandContrib => "candContrib",
        }
    }

    /// Query parameter carrying the entity id.
    pub fn id_param(&self) -> &'static str {
        match self {
            ApiMethod::GetLegislators => "id",
            _ => "cid",
        }
    }

    /// Where the entity of interest lives inside a response document.
    pub fn entity_path(&self) -> &'static [&'static str] {
        match self {
            ApiMethod::GetLegislators => &["response", "legislator"],
            ApiMethod::CandSummary => &["response", "summary"],
            ApiMethod::CandSector => &["response", "sectors", "sector"],
            ApiMethod::CandContrib => &["response", "contributors", "contributor"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Xml,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Xml => "xml",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: ApiMethod,
    pub entity_id: String,
    pub cycle: Option<u16>,
    pub output: Option<OutputFormat>,
}

impl ApiRequest {
    /// Legislators for a state; no `output` so the API answers in its default XML.
    pub fn legislators(state_code: &str) -> Self {
        Self {
            method: ApiMethod::GetLegislators,
            entity_id: state_code.to_string(),
            cycle: None,
            output: None,
        }
    }

    pub fn candidate(method: ApiMethod, cid: &str, cycle: u16) -> Self {
        Self {
            method,
            entity_id: cid.to_string(),
            cycle: Some(cycle),
            output: Some(OutputFormat::Json),
        }
    }

    /// Query pairs minus the api key, in a stable order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("method", self.method.as_str().to_string()),
            (self.method.id_param(), self.entity_id.clone()),
        ];
        if let Some(cycle) = self.cycle {
            pairs.push(("cycle", cycle.to_string()));
        }
        if let Some(output) = self.output {
            pairs.push(("output", output.as_str().to_string()));
        }
        pairs
    }
}
