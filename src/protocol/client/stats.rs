// Aggregate queries

use super::ScriptClient;
use crate::error::Result;
use crate::protocol::constants::{RemoteFunction, RANKING_LIMIT};
use crate::protocol::types::{Availability, RankingRow, Summary};
use serde_json::json;
use tracing::debug;

impl ScriptClient {
    pub async fn summary(&self, user_id: &str) -> Result<Option<Summary>> {
        let reply: Option<Availability<Summary>> = self
            .call(RemoteFunction::GetSummary, vec![json!(user_id)])
            .await?;

        let summary = reply.and_then(Availability::into_option);
        debug!(?summary, "summary received");
        Ok(summary)
    }

    pub async fn ranking(&self) -> Result<Option<Vec<RankingRow>>> {
        let reply: Option<Availability<Vec<RankingRow>>> =
            self.call(RemoteFunction::GetRanking, Vec::new()).await?;

        Ok(reply.and_then(Availability::into_option).map(top_ranked))
    }
}

/// Order rows by rank and keep the leaders. Rows tied on rank keep their
/// sheet order; unranked rows (rank 0) go last.
pub(crate) fn top_ranked(mut rows: Vec<RankingRow>) -> Vec<RankingRow> {
    rows.sort_by_key(|row| (row.rank == 0, row.rank));
    rows.truncate(RANKING_LIMIT);
    rows
}
