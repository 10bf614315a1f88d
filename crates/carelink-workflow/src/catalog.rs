//! Caretaker service catalog and NRI–caretaker connections.
//!
//! Caretakers own their services and share a `CT-XXXXXXXX` code. An NRI
//! enters the code to link to the caretaker, and from then on may browse
//! and request that caretaker's active services.

use carelink_core::error::CarelinkError;
use carelink_core::models::account::{Account, AccountStatus, Role};
use carelink_core::models::connection::{
    CARETAKER_CODE_LEN, CARETAKER_CODE_PREFIX, is_well_formed_code, normalize_caretaker_code,
};
use carelink_core::models::service::{CreateService, Service, UpdateService};
use carelink_core::models::session::Actor;
use carelink_core::repository::{AccountRepository, ConnectionRepository, ServiceRepository};
use rand::Rng;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::WorkflowError;
use crate::lifecycle::require_role;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
/// Fresh codes to try before giving up on a collision streak.
const CODE_ATTEMPTS: usize = 5;

fn generate_caretaker_code() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..CARETAKER_CODE_LEN)
        .map(|_| char::from(CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())]))
        .collect();
    format!("{CARETAKER_CODE_PREFIX}{suffix}")
}

/// `NotFound` becomes `mapped`; anything else is a store failure.
fn not_found_as(err: CarelinkError, mapped: WorkflowError) -> WorkflowError {
    if err.is_not_found() {
        mapped
    } else {
        WorkflowError::UpdateFailed(err.to_string())
    }
}

/// A caretaker's service as entered in the catalog form.
#[derive(Debug, Clone)]
pub struct ServiceDraft {
    pub name: String,
    pub description: String,
    pub price: Option<f64>,
    pub image: String,
    pub is_active: bool,
}

impl ServiceDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            price: None,
            image: String::new(),
            is_active: true,
        }
    }

    /// Trim text fields and check name and price.
    fn validated(self) -> Result<Self, WorkflowError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(WorkflowError::InvalidInput("service name is required".into()));
        }
        if let Some(price) = self.price
            && !(price.is_finite() && price >= 0.0)
        {
            return Err(WorkflowError::InvalidInput(
                "price must be a non-negative number".into(),
            ));
        }
        Ok(Self {
            name,
            description: self.description.trim().to_string(),
            ..self
        })
    }
}

pub struct ServiceCatalog<S, C, A>
where
    S: ServiceRepository,
    C: ConnectionRepository,
    A: AccountRepository,
{
    services: S,
    connections: C,
    accounts: A,
}

impl<S, C, A> ServiceCatalog<S, C, A>
where
    S: ServiceRepository,
    C: ConnectionRepository,
    A: AccountRepository,
{
    pub fn new(services: S, connections: C, accounts: A) -> Self {
        Self {
            services,
            connections,
            accounts,
        }
    }

    // -- Caretaker side ----------------------------------------------------

    pub async fn create_service(
        &self,
        actor: &Actor,
        draft: ServiceDraft,
    ) -> Result<Service, WorkflowError> {
        require_role(actor, Role::Caretaker)?;
        let draft = draft.validated()?;

        let service = self
            .services
            .create(CreateService {
                caretaker_id: actor.principal_id,
                name: draft.name,
                description: draft.description,
                price: draft.price,
                image: draft.image,
                is_active: draft.is_active,
            })
            .await
            .map_err(|e| WorkflowError::UpdateFailed(e.to_string()))?;

        info!(service_id = %service.id, caretaker_id = %actor.principal_id, "Service added");
        Ok(service)
    }

    /// Replace every editable field of an owned service.
    pub async fn update_service(
        &self,
        actor: &Actor,
        id: Uuid,
        draft: ServiceDraft,
    ) -> Result<Service, WorkflowError> {
        self.owned_service(actor, id).await?;
        let draft = draft.validated()?;

        self.services
            .update(
                id,
                UpdateService {
                    name: Some(draft.name),
                    description: Some(draft.description),
                    price: Some(draft.price),
                    image: Some(draft.image),
                    is_active: Some(draft.is_active),
                },
            )
            .await
            .map_err(|e| not_found_as(e, WorkflowError::ServiceNotFound))
    }

    /// Existing requests keep the service name they were raised with.
    pub async fn delete_service(&self, actor: &Actor, id: Uuid) -> Result<(), WorkflowError> {
        self.owned_service(actor, id).await?;
        self.services
            .delete(id)
            .await
            .map_err(|e| not_found_as(e, WorkflowError::ServiceNotFound))?;

        info!(service_id = %id, caretaker_id = %actor.principal_id, "Service deleted");
        Ok(())
    }

    pub async fn toggle_active(&self, actor: &Actor, id: Uuid) -> Result<Service, WorkflowError> {
        let current = self.owned_service(actor, id).await?;
        let updated = self
            .services
            .update(
                id,
                UpdateService {
                    is_active: Some(!current.is_active),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| not_found_as(e, WorkflowError::ServiceNotFound))?;

        info!(service_id = %id, is_active = updated.is_active, "Service availability changed");
        Ok(updated)
    }

    /// All of the caretaker's own services, active or not.
    pub async fn own_services(&self, actor: &Actor) -> Result<Vec<Service>, WorkflowError> {
        require_role(actor, Role::Caretaker)?;
        Ok(self
            .services
            .list_by_caretaker(actor.principal_id, false)
            .await?)
    }

    /// The caretaker's shareable code, issued on first use.
    pub async fn caretaker_code(&self, actor: &Actor) -> Result<String, WorkflowError> {
        require_role(actor, Role::Caretaker)?;

        for _ in 0..CODE_ATTEMPTS {
            match self.connections.get_profile(actor.principal_id).await {
                Ok(profile) => return Ok(profile.code),
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(WorkflowError::UpdateFailed(e.to_string())),
            }

            match self
                .connections
                .create_profile(actor.principal_id, generate_caretaker_code())
                .await
            {
                Ok(profile) => {
                    info!(
                        caretaker_id = %actor.principal_id,
                        code = %profile.code,
                        "Caretaker code issued"
                    );
                    return Ok(profile.code);
                }
                // Either the code collided or a concurrent call created the
                // profile; the next round tells them apart.
                Err(CarelinkError::AlreadyExists { .. }) => {}
                Err(e) => return Err(WorkflowError::UpdateFailed(e.to_string())),
            }
        }

        Err(WorkflowError::UpdateFailed(
            "could not allocate a unique caretaker code".into(),
        ))
    }

    // -- NRI side ----------------------------------------------------------

    /// Link the NRI to the caretaker holding `code`. Returns the
    /// caretaker's account.
    pub async fn connect(&self, actor: &Actor, code: &str) -> Result<Account, WorkflowError> {
        require_role(actor, Role::Nri)?;

        let code = normalize_caretaker_code(code);
        if code.is_empty() {
            return Err(WorkflowError::InvalidInput("caretaker code is required".into()));
        }
        if !is_well_formed_code(&code) {
            return Err(WorkflowError::UnknownCaretakerCode);
        }

        let profile = self
            .connections
            .find_by_code(&code)
            .await
            .map_err(|e| not_found_as(e, WorkflowError::UnknownCaretakerCode))?;
        let caretaker = self
            .accounts
            .get(profile.caretaker_id)
            .await
            .map_err(|e| not_found_as(e, WorkflowError::UnknownCaretakerCode))?;
        if caretaker.role != Role::Caretaker {
            return Err(WorkflowError::UnknownCaretakerCode);
        }

        match self
            .connections
            .link(actor.principal_id, caretaker.principal_id)
            .await
        {
            Ok(_) => {}
            Err(CarelinkError::AlreadyExists { .. }) => {
                return Err(WorkflowError::AlreadyConnected);
            }
            Err(e) => return Err(WorkflowError::UpdateFailed(e.to_string())),
        }

        info!(
            nri_id = %actor.principal_id,
            caretaker_id = %caretaker.principal_id,
            "NRI connected to caretaker"
        );
        Ok(caretaker)
    }

    /// Accounts of the caretakers the NRI is linked to, in link order.
    pub async fn connected_caretakers(&self, actor: &Actor) -> Result<Vec<Account>, WorkflowError> {
        require_role(actor, Role::Nri)?;

        let links = self.connections.links_for_nri(actor.principal_id).await?;
        let mut caretakers = Vec::with_capacity(links.len());
        for link in links {
            match self.accounts.get(link.caretaker_id).await {
                Ok(account) => caretakers.push(account),
                Err(e) if e.is_not_found() => {
                    warn!(caretaker_id = %link.caretaker_id, "Linked caretaker has no account");
                }
                Err(e) => return Err(WorkflowError::UpdateFailed(e.to_string())),
            }
        }
        Ok(caretakers)
    }

    /// A linked caretaker's active services.
    pub async fn available_services(
        &self,
        actor: &Actor,
        caretaker_id: Uuid,
    ) -> Result<Vec<Service>, WorkflowError> {
        require_role(actor, Role::Nri)?;
        if !self.is_linked(actor.principal_id, caretaker_id).await? {
            return Err(WorkflowError::NotConnected);
        }
        Ok(self.services.list_by_caretaker(caretaker_id, true).await?)
    }

    /// The service `actor` wants to request, if they may: it must be
    /// active and named, its caretaker an active caretaker account, and the
    /// NRI linked to that caretaker.
    pub(crate) async fn requestable(
        &self,
        actor: &Actor,
        service_id: Uuid,
    ) -> Result<Service, WorkflowError> {
        let service = self
            .services
            .get_by_id(service_id)
            .await
            .map_err(|e| not_found_as(e, WorkflowError::ServiceUnavailable))?;
        if !service.is_active || service.name.trim().is_empty() {
            return Err(WorkflowError::ServiceUnavailable);
        }

        let caretaker = self
            .accounts
            .get(service.caretaker_id)
            .await
            .map_err(|e| not_found_as(e, WorkflowError::CaretakerUnavailable))?;
        if caretaker.role != Role::Caretaker || caretaker.status != AccountStatus::Active {
            return Err(WorkflowError::CaretakerUnavailable);
        }

        if !self.is_linked(actor.principal_id, caretaker.principal_id).await? {
            return Err(WorkflowError::NotConnected);
        }
        Ok(service)
    }

    pub(crate) async fn is_linked(
        &self,
        nri_id: Uuid,
        caretaker_id: Uuid,
    ) -> Result<bool, WorkflowError> {
        Ok(self.connections.is_linked(nri_id, caretaker_id).await?)
    }

    async fn owned_service(&self, actor: &Actor, id: Uuid) -> Result<Service, WorkflowError> {
        require_role(actor, Role::Caretaker)?;
        let service = self
            .services
            .get_by_id(id)
            .await
            .map_err(|e| not_found_as(e, WorkflowError::ServiceNotFound))?;
        if service.caretaker_id != actor.principal_id {
            return Err(WorkflowError::NotOwner);
        }
        Ok(service)
    }
}
