use crate::core::chart;
use crate::core::coerce::to_list;
use crate::core::parser;
use crate::core::session::{Completion, Ticket, ViewSession, ViewStatus};
use crate::domain::model::{
    ApiMethod, ApiRequest, AttributeNode, ChartPoint, DisplayAmount, RecordList,
};
use crate::domain::ports::Fetcher;
use crate::utils::error::{AppError, ParseError, Result};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateSummary {
    pub cid: String,
    pub name: String,
    pub party: String,
    pub state: String,
    pub chamber: String,
    pub cycle: String,
    pub first_elected: String,
    pub next_election: String,
    pub total: DisplayAmount,
    pub spent: DisplayAmount,
    pub cash_on_hand: DisplayAmount,
    pub debt: DisplayAmount,
    pub last_updated: String,
    pub source: String,
}

impl CandidateSummary {
    pub fn from_node(node: &AttributeNode) -> Self {
        Self {
            cid: node.text("cid").to_string(),
            name: node.text("cand_name").to_string(),
            party: node.text("party").to_string(),
            state: node.text("state").to_string(),
            chamber: node.text("chamber").to_string(),
            cycle: node.text("cycle").to_string(),
            first_elected: node.text("first_elected").to_string(),
            next_election: node.text("next_election").to_string(),
            total: node.currency("total"),
            spent: node.currency("spent"),
            cash_on_hand: node.currency("cash_on_hand"),
            debt: node.currency("debt"),
            last_updated: node.text("last_updated").to_string(),
            source: node.text("source").to_string(),
        }
    }
}

/// One labelled amount in the sectors or contributors list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmountLine {
    pub name: String,
    pub amount: DisplayAmount,
}

fn amount_lines(records: &RecordList, name_field: &str) -> Vec<AmountLine> {
    records
        .iter()
        .map(|node| AmountLine {
            name: node.text(name_field).to_string(),
            amount: node.currency("total"),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateProfile {
    pub summary: CandidateSummary,
    pub sectors: Vec<AmountLine>,
    pub contributors: Vec<AmountLine>,
    pub sector_chart: Vec<ChartPoint>,
    pub contributor_chart: Vec<ChartPoint>,
}

impl CandidateProfile {
    pub fn from_records(summary: &AttributeNode, sectors: &RecordList, contributors: &RecordList) -> Self {
        Self {
            summary: CandidateSummary::from_node(summary),
            sectors: amount_lines(sectors, "sector_name"),
            contributors: amount_lines(contributors, "org_name"),
            sector_chart: chart::reduce(sectors, "sector_name", "total"),
            contributor_chart: chart::reduce(contributors, "org_name", "total"),
        }
    }
}

async fn fetch_records<F: Fetcher + ?Sized>(
    fetcher: &F,
    method: ApiMethod,
    cid: &str,
    cycle: u16,
) -> Result<RecordList> {
    let payload = fetcher
        .fetch(&ApiRequest::candidate(method, cid, cycle))
        .await?;
    let parsed = match method {
        ApiMethod::CandSummary => Some(parser::parse(&payload, method.entity_path())?),
        _ => parser::parse_lenient(&payload, method.entity_path())?,
    };
    Ok(to_list(parsed))
}

/// Summary, sectors and contributors, fetched concurrently.
///
/// Any failure fails the whole profile, so a half-populated card is never built.
pub async fn fetch_profile<F: Fetcher + ?Sized>(fetcher: &F, cid: &str, cycle: u16) -> Result<CandidateProfile> {
    let (summary, sectors, contributors) = tokio::try_join!(
        fetch_records(fetcher, ApiMethod::CandSummary, cid, cycle),
        fetch_records(fetcher, ApiMethod::CandSector, cid, cycle),
        fetch_records(fetcher, ApiMethod::CandContrib, cid, cycle),
    )?;

    let summary = summary.first().ok_or_else(|| {
        AppError::from(ParseError::UnexpectedShape {
            path: ApiMethod::CandSummary.entity_path().join("."),
        })
    })?;

    tracing::info!(
        "💰 {}: {} sectors, {} contributors (cycle {})",
        cid,
        sectors.len(),
        contributors.len(),
        cycle
    );
    Ok(CandidateProfile::from_records(summary, &sectors, &contributors))
}

/// Candidate detail view keyed by candidate id.
pub struct CandidateView<F: Fetcher> {
    fetcher: F,
    cycle: u16,
    session: ViewSession<CandidateProfile>,
}

impl<F: Fetcher> CandidateView<F> {
    pub fn new(fetcher: F, cycle: u16) -> Self {
        Self {
            fetcher,
            cycle,
            session: ViewSession::new(),
        }
    }

    pub async fn open(&mut self, cid: &str) -> Result<Completion> {
        let ticket = self.begin(cid);
        let outcome = self.load(&ticket).await;
        self.apply(ticket, outcome)
    }

    /// Issue a ticket for `cid` without fetching.
    pub fn begin(&mut self, cid: &str) -> Ticket {
        self.session.begin(cid)
    }

    pub async fn load(&self, ticket: &Ticket) -> Result<CandidateProfile> {
        fetch_profile(&self.fetcher, ticket.key(), self.cycle).await
    }

    /// Publish a finished load unless a newer candidate was opened since.
    pub fn apply(&mut self, ticket: Ticket, outcome: Result<CandidateProfile>) -> Result<Completion> {
        let cid = ticket.key().to_string();
        self.session.settle(ticket, outcome).inspect_err(|e| {
            tracing::error!("❌ Loading candidate {} failed: {}", cid, e);
        })
    }

    pub fn current(&self) -> Option<&CandidateProfile> {
        self.session.data()
    }

    pub fn status(&self) -> &ViewStatus {
        self.session.status()
    }

    pub fn cycle(&self) -> u16 {
        self.cycle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_from_records() {
        let summary = AttributeNode::new()
            .with("cand_name", "Pelosi, Nancy")
            .with("party", "D")
            .with("total", "16456478.66")
            .with("debt", "");
        let sectors: RecordList = vec![
            AttributeNode::new().with("sector_name", "Finance").with("total", "1,200,000"),
            AttributeNode::new().with("sector_name", "Other").with("total", "n/a"),
        ]
        .into();

        let profile = CandidateProfile::from_records(&summary, &sectors, &RecordList::empty());

        assert_eq!(profile.summary.total.currency(), "$16,456,478.66");
        assert_eq!(profile.summary.debt, DisplayAmount::Unavailable);
        assert_eq!(profile.summary.spent, DisplayAmount::Unavailable);
        assert_eq!(profile.sectors[0].amount.currency(), "$1,200,000");
        assert_eq!(profile.sectors[1].amount, DisplayAmount::Unavailable);
        assert_eq!(profile.sector_chart[0].value, 1_200_000);
        assert_eq!(profile.sector_chart[1].value, 0);
        assert!(profile.contributors.is_empty());
        assert!(profile.contributor_chart.is_empty());
    }
}
