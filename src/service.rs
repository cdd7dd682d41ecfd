use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::Result;
use crate::adapters::{Invocation, Operation, Outcome};
use crate::catalog::CatalogRepository;
use crate::schema::{CatalogStatements, SchemaBootstrapper};
use crate::session::{Connector, SessionManager};

/// Process-wide entry point shared by every front end.
///
/// Holds no per-invocation state; one instance lives for the life of the
/// container and every adapter funnels into [`CatalogService::invoke`].
pub struct CatalogService<C: Connector> {
    sessions: Arc<SessionManager<C>>,
    bootstrapper: SchemaBootstrapper<C>,
    repository: CatalogRepository<C>,
    instance_id: Uuid,
}

impl<C: Connector> CatalogService<C> {
    pub fn new(sessions: Arc<SessionManager<C>>) -> Self {
        let statements = Arc::new(CatalogStatements::new(&sessions.settings().local_dc));
        // Time-ordered id so container reuse shows up in the logs
        let instance_id = Uuid::now_v7();
        info!("Container instance {} starting", instance_id);

        Self {
            bootstrapper: SchemaBootstrapper::new(Arc::clone(&sessions), Arc::clone(&statements)),
            repository: CatalogRepository::new(Arc::clone(&sessions), statements),
            sessions,
            instance_id,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionManager<C>> {
        &self.sessions
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub fn bootstrapper(&self) -> &SchemaBootstrapper<C> {
        &self.bootstrapper
    }

    pub fn repository(&self) -> &CatalogRepository<C> {
        &self.repository
    }

    /// The per-invocation log line; platforms with their own log channel echo it there too
    pub fn invocation_log_line(&self, operation: Operation) -> String {
        format!("Container instance {} handling {}", self.instance_id, operation.name())
    }

    /// Run an already-translated invocation and shape the result
    pub async fn invoke(&self, invocation: Invocation) -> Outcome {
        let operation = invocation.operation();
        info!("{}", self.invocation_log_line(operation));

        let result = match invocation {
            Invocation::CreateSchema => self.bootstrapper.create_schema().await.map(Outcome::text),
            Invocation::AddItem(item) => self.repository.add_item(item).await.and_then(Outcome::json),
            Invocation::GetItem { item_id } => {
                self.repository.get_item(item_id).await.and_then(Outcome::json)
            }
        };

        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("{} failed: {}", operation.name(), e);
                Outcome::from_error(&e)
            }
        }
    }

    /// Like [`invoke`](Self::invoke) but also turns translation failures into outcomes
    pub async fn handle(&self, invocation: Result<Invocation>) -> Outcome {
        match invocation {
            Ok(invocation) => self.invoke(invocation).await,
            Err(e) => {
                warn!("Rejected invocation: {}", e);
                Outcome::from_error(&e)
            }
        }
    }
}
