// src/services/profile_service.rs

use rust_decimal::Decimal;
use serde_json::json;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{field_error, AppError},
    db::{AuditRepository, ProfileRepository},
    models::{
        audit::AuditAction,
        profile::{Profile, Session, UpdateProfilePayload, UserRole},
    },
    services::access::check_access,
};

#[derive(Clone)]
pub struct ProfileService {
    repo: ProfileRepository,
    audit: AuditRepository,
}

impl ProfileService {
    pub fn new(repo: ProfileRepository, audit: AuditRepository) -> Self {
        Self { repo, audit }
    }

    pub async fn get<'e, E>(&self, executor: E, id: Uuid) -> Result<Profile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_by_id(executor, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Profile".into()))
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<Profile>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list(executor).await
    }

    pub async fn update<'c, A>(
        &self,
        executor: A,
        session: &Session,
        id: Uuid,
        input: &UpdateProfilePayload,
    ) -> Result<Profile, AppError>
    where
        A: Acquire<'c, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let target = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Profile".into()))?;

        check_profile_update(session, &target, input)?;

        let profile = self
            .repo
            .update(&mut *tx, id, input)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Profile".into()))?;

        self.audit
            .record(
                &mut *tx,
                "profiles",
                id,
                AuditAction::Update,
                session.profile_id,
                json!({
                    "role": profile.role,
                    "isActive": profile.is_active,
                    "agentCommissionPercentage": profile.agent_commission_percentage,
                }),
            )
            .await?;

        tx.commit().await?;

        if target.role != profile.role {
            tracing::info!(profile_id = %id, from = %target.role, to = %profile.role, "Papel alterado");
        }
        Ok(profile)
    }
}

/// Regras de edição de perfil que dependem de quem edita.
///
/// Ninguém edita um perfil de papel acima do seu, e conceder ou retirar
/// SuperAdmin exige SuperAdmin. O percentual do agente fica entre 0 e 100.
fn check_profile_update(session: &Session, target: &Profile, input: &UpdateProfilePayload) -> Result<(), AppError> {
    if !check_access(Some(session.role), target.role) {
        return Err(AppError::Forbidden(target.role));
    }

    let touches_super_admin = match input.role {
        Some(new_role) => new_role != target.role && (new_role == UserRole::SuperAdmin || target.role == UserRole::SuperAdmin),
        None => false,
    };
    if touches_super_admin && !check_access(Some(session.role), UserRole::SuperAdmin) {
        return Err(AppError::Forbidden(UserRole::SuperAdmin));
    }

    if let Some(pct) = input.agent_commission_percentage {
        if pct < Decimal::ZERO || pct > Decimal::ONE_HUNDRED {
            return Err(field_error("agentCommissionPercentage", "out_of_range"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn session(role: UserRole) -> Session {
        Session {
            profile_id: Uuid::new_v4(),
            role,
            agent_commission_percentage: None,
        }
    }

    fn profile(role: UserRole) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            first_name: Some("Ana".into()),
            last_name: None,
            email: None,
            role,
            is_active: true,
            agent_commission_percentage: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn change_role(role: UserRole) -> UpdateProfilePayload {
        UpdateProfilePayload {
            role: Some(role),
            is_active: None,
            agent_commission_percentage: None,
        }
    }

    #[test]
    fn admin_can_promote_agent_to_admin() {
        let result = check_profile_update(&session(UserRole::Admin), &profile(UserRole::Agent), &change_role(UserRole::Admin));
        assert!(result.is_ok());
    }

    #[test]
    fn only_super_admin_grants_or_revokes_super_admin() {
        let admin = session(UserRole::Admin);
        assert!(matches!(
            check_profile_update(&admin, &profile(UserRole::Agent), &change_role(UserRole::SuperAdmin)),
            Err(AppError::Forbidden(UserRole::SuperAdmin))
        ));
        assert!(matches!(
            check_profile_update(&admin, &profile(UserRole::SuperAdmin), &change_role(UserRole::Agent)),
            Err(AppError::Forbidden(UserRole::SuperAdmin))
        ));

        let root = session(UserRole::SuperAdmin);
        assert!(check_profile_update(&root, &profile(UserRole::Agent), &change_role(UserRole::SuperAdmin)).is_ok());
    }

    #[test]
    fn percentage_outside_zero_to_hundred_is_rejected() {
        let mut input = change_role(UserRole::Agent);
        input.role = None;
        input.agent_commission_percentage = Some(Decimal::new(1005, 1));

        let result = check_profile_update(&session(UserRole::Admin), &profile(UserRole::Agent), &input);
        assert!(matches!(result, Err(AppError::ValidationError(_))));

        input.agent_commission_percentage = Some(Decimal::ONE_HUNDRED);
        assert!(check_profile_update(&session(UserRole::Admin), &profile(UserRole::Agent), &input).is_ok());
    }

    #[test]
    fn admin_cannot_touch_any_field_of_a_super_admin() {
        let admin = session(UserRole::Admin);
        let root = profile(UserRole::SuperAdmin);

        let deactivate = UpdateProfilePayload {
            role: None,
            is_active: Some(false),
            agent_commission_percentage: None,
        };
        assert!(matches!(
            check_profile_update(&admin, &root, &deactivate),
            Err(AppError::Forbidden(UserRole::SuperAdmin))
        ));

        let new_pct = UpdateProfilePayload {
            role: None,
            is_active: None,
            agent_commission_percentage: Some(Decimal::TEN),
        };
        assert!(matches!(
            check_profile_update(&admin, &root, &new_pct),
            Err(AppError::Forbidden(UserRole::SuperAdmin))
        ));

        assert!(check_profile_update(&session(UserRole::SuperAdmin), &root, &deactivate).is_ok());
    }

    #[test]
    fn admin_may_deactivate_peers_and_agents() {
        let admin = session(UserRole::Admin);
        let deactivate = UpdateProfilePayload {
            role: None,
            is_active: Some(false),
            agent_commission_percentage: None,
        };

        assert!(check_profile_update(&admin, &profile(UserRole::Admin), &deactivate).is_ok());
        assert!(check_profile_update(&admin, &profile(UserRole::Agent), &deactivate).is_ok());
    }
}
