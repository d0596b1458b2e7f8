//! Data source selected on the command line.

use podium::data::{
    Credentials, DataError, DataSource, EventQuery, EventResult, IracingClient, MemorySource,
    Result, Season, Standing, StandingsQuery, SubsessionDetail, SubsessionId,
};
use std::path::Path;
use tracing::info;

/// Live API client or offline fixture.
#[derive(Debug)]
pub(crate) enum Source {
    Iracing(IracingClient),
    Fixture(MemorySource),
}

impl Source {
    /// Load `fixture` when given, otherwise log in to iRacing.
    pub(crate) async fn connect(
        fixture: Option<&Path>,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<Self> {
        if let Some(path) = fixture {
            info!(path = %path.display(), "Using fixture data");
            return Ok(Self::Fixture(MemorySource::from_json_file(path)?));
        }

        let (Some(username), Some(password)) = (username, password) else {
            return Err(DataError::Auth(
                "set IRACING_USERNAME and IRACING_PASSWORD or pass --fixture".to_string(),
            ));
        };
        let client = IracingClient::new(Credentials::new(username, password))?;
        client.login().await?;
        Ok(Self::Iracing(client))
    }
}

impl DataSource for Source {
    async fn active_seasons(&self) -> Result<Vec<Season>> {
        match self {
            Self::Iracing(client) => client.active_seasons().await,
            Self::Fixture(memory) => memory.active_seasons().await,
        }
    }

    async fn standings(&self, query: StandingsQuery) -> Result<Vec<Standing>> {
        match self {
            Self::Iracing(client) => client.standings(query).await,
            Self::Fixture(memory) => memory.standings(query).await,
        }
    }

    async fn event_results(&self, query: EventQuery) -> Result<Vec<EventResult>> {
        match self {
            Self::Iracing(client) => client.event_results(query).await,
            Self::Fixture(memory) => memory.event_results(query).await,
        }
    }

    async fn subsession_detail(&self, subsession_id: SubsessionId) -> Result<SubsessionDetail> {
        match self {
            Self::Iracing(client) => client.subsession_detail(subsession_id).await,
            Self::Fixture(memory) => memory.subsession_detail(subsession_id).await,
        }
    }
}
