// src/models/profile.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::ToSchema;

// --- ENUMS ---

// Mapeia o CREATE TYPE user_role do banco.
// A ordem das variantes define a hierarquia: Agent < Admin < SuperAdmin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role")]
pub enum UserRole {
    Agent,
    Admin,
    SuperAdmin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Agent => "Agent",
            UserRole::Admin => "Admin",
            UserRole::SuperAdmin => "SuperAdmin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Agent" => Ok(UserRole::Agent),
            "Admin" => Ok(UserRole::Admin),
            "SuperAdmin" => Ok(UserRole::SuperAdmin),
            other => Err(format!("papel desconhecido: {other}")),
        }
    }
}

// --- PERFIL ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub agent_commission_percentage: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => self.email.clone().unwrap_or_default(),
        }
    }
}

/// Contexto de sessão do usuário autenticado.
///
/// Montado pelo middleware de autenticação e passado explicitamente para
/// todas as operações que precisam de identidade (auditoria, papéis, agente
/// responsável por uma viagem).
#[derive(Debug, Clone)]
pub struct Session {
    pub profile_id: Uuid,
    pub role: UserRole,
    pub agent_commission_percentage: Option<Decimal>,
}

impl From<&Profile> for Session {
    fn from(profile: &Profile) -> Self {
        Self {
            profile_id: profile.id,
            role: profile.role,
            agent_commission_percentage: profile.agent_commission_percentage,
        }
    }
}

// Dados para atualização administrativa de um perfil
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfilePayload {
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
    pub agent_commission_percentage: Option<Decimal>,
}

// Estrutura de dados ("claims") do JWT emitido pelo serviço de autenticação
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do perfil)
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued At
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_are_totally_ordered() {
        assert!(UserRole::Agent < UserRole::Admin);
        assert!(UserRole::Admin < UserRole::SuperAdmin);
        assert_eq!(UserRole::SuperAdmin.max(UserRole::Agent), UserRole::SuperAdmin);
    }

    #[test]
    fn parses_exact_role_strings_only() {
        assert_eq!("SuperAdmin".parse::<UserRole>(), Ok(UserRole::SuperAdmin));
        assert_eq!("Agent".parse::<UserRole>(), Ok(UserRole::Agent));
        assert!("superadmin".parse::<UserRole>().is_err());
        assert!("Manager".parse::<UserRole>().is_err());
    }

    #[test]
    fn role_serializes_as_database_label() {
        let json = serde_json::to_string(&UserRole::SuperAdmin).unwrap();
        assert_eq!(json, "\"SuperAdmin\"");
    }
}
