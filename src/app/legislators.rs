use crate::adapters::storage::SELECTION_KEY;
use crate::app::routes::Route;
use crate::core::parser::{self, PLAIN_TEXT_FIELD};
use crate::core::session::{Completion, Ticket, ViewSession, ViewStatus};
use crate::domain::model::{ApiMethod, ApiRequest, AttributeNode, RecordList};
use crate::domain::ports::{Fetcher, KeyValueStore};
use crate::utils::error::{AppError, Result};
use serde::Serialize;

/// Selectable states: the fifty states plus DC.
pub const US_STATES: &[(&str, &str)] = &[
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("DC", "District Of Columbia"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
];

/// Canonical code for user input such as `" ca "`.
pub fn normalize_state(input: &str) -> Result<&'static str> {
    let wanted = input.trim();
    US_STATES
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(wanted))
        .map(|(code, _)| *code)
        .ok_or_else(|| AppError::UnknownState {
            code: input.to_string(),
        })
}

pub fn state_name(code: &str) -> Option<&'static str> {
    US_STATES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegislatorEntry {
    pub cid: String,
    pub name: String,
    pub party: String,
    pub office: String,
    pub first_elected: String,
    pub website: String,
    /// `/candidate/<cid>`; absent when the record carries no id.
    pub link: Option<String>,
}

impl LegislatorEntry {
    pub fn from_node(node: &AttributeNode) -> Self {
        let cid = node.text("cid").to_string();
        // a degraded plain-text response still shows up as one entry
        let name = match node.text("firstlast") {
            "" => node.text(PLAIN_TEXT_FIELD),
            name => name,
        };
        let link = (!cid.is_empty()).then(|| Route::Candidate { cid: cid.clone() }.path());
        Self {
            name: name.to_string(),
            party: node.text("party").to_string(),
            office: node.text("office").to_string(),
            first_elected: node.text("first_elected").to_string(),
            website: node.text("website").to_string(),
            link,
            cid,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegislatorList {
    pub state_code: String,
    pub state_name: String,
    pub entries: Vec<LegislatorEntry>,
}

/// One request for `code`, parsed into entries in API order.
pub async fn fetch_legislators<F: Fetcher + ?Sized>(fetcher: &F, code: &str) -> Result<LegislatorList> {
    let request = ApiRequest::legislators(code);
    let payload = fetcher.fetch(&request).await?;
    let parsed = parser::parse(&payload, ApiMethod::GetLegislators.entity_path())?;
    let records = RecordList::from(parsed);

    tracing::info!("👥 {}: {} legislators", code, records.len());
    Ok(LegislatorList {
        state_code: code.to_string(),
        state_name: state_name(code).unwrap_or(code).to_string(),
        entries: records.iter().map(LegislatorEntry::from_node).collect(),
    })
}

/// State picker plus legislator list.
pub struct LegislatorsView<F: Fetcher, S: KeyValueStore> {
    fetcher: F,
    store: S,
    session: ViewSession<LegislatorList>,
}

impl<F: Fetcher, S: KeyValueStore> LegislatorsView<F, S> {
    pub fn new(fetcher: F, store: S) -> Self {
        Self {
            fetcher,
            store,
            session: ViewSession::new(),
        }
    }

    /// State code persisted by the last submission, if any.
    pub async fn restore_selection(&self) -> Result<Option<String>> {
        let stored = self.store.get(SELECTION_KEY).await?;
        Ok(stored.and_then(|code| normalize_state(&code).ok().map(str::to_string)))
    }

    /// Submit a state selection: persist it, then fetch and publish its legislators.
    ///
    /// On failure the previously shown list stays in place and the error is returned.
    pub async fn select_state(&mut self, input: &str) -> Result<Completion> {
        let ticket = self.submit(input).await?;
        let outcome = self.load(&ticket).await;
        self.apply(ticket, outcome)
    }

    /// Validate and persist a selection and issue its ticket. Nothing is fetched yet.
    pub async fn submit(&mut self, input: &str) -> Result<Ticket> {
        let code = normalize_state(input)?;
        self.store.set(SELECTION_KEY, code).await?;
        Ok(self.session.begin(code))
    }

    /// Fetch the list for an issued ticket; several loads may be in flight at once.
    pub async fn load(&self, ticket: &Ticket) -> Result<LegislatorList> {
        fetch_legislators(&self.fetcher, ticket.key()).await
    }

    /// Publish a finished load. Responses for superseded tickets are dropped.
    pub fn apply(&mut self, ticket: Ticket, outcome: Result<LegislatorList>) -> Result<Completion> {
        let code = ticket.key().to_string();
        self.session.settle(ticket, outcome).inspect_err(|e| {
            tracing::error!("❌ Loading legislators for {} failed: {}", code, e);
        })
    }

    pub fn current(&self) -> Option<&LegislatorList> {
        self.session.data()
    }

    pub fn status(&self) -> &ViewStatus {
        self.session.status()
    }
}
