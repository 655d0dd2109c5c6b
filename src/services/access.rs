// src/services/access.rs

use crate::models::profile::UserRole;

/// Verifica se o papel do usuário cobre o papel exigido.
///
/// A hierarquia é total: `Agent < Admin < SuperAdmin`. SuperAdmin pode tudo,
/// Admin pode agir como Agent, Agent não escala. Sem papel (usuário ausente
/// ou papel desconhecido) nunca tem acesso.
pub fn check_access(user_role: Option<UserRole>, required: UserRole) -> bool {
    user_role.is_some_and(|role| role >= required)
}

#[cfg(test)]
mod tests {
    use super::*;
    use UserRole::*;

    #[test]
    fn access_table() {
        let cases = [
            (SuperAdmin, SuperAdmin, true),
            (SuperAdmin, Admin, true),
            (SuperAdmin, Agent, true),
            (Admin, SuperAdmin, false),
            (Admin, Admin, true),
            (Admin, Agent, true),
            (Agent, SuperAdmin, false),
            (Agent, Admin, false),
            (Agent, Agent, true),
        ];

        for (user, required, expected) in cases {
            assert_eq!(
                check_access(Some(user), required),
                expected,
                "{user} -> {required}"
            );
        }
    }

    #[test]
    fn no_user_has_no_access() {
        assert!(!check_access(None, Agent));
        assert!(!check_access(None, SuperAdmin));
    }

    #[test]
    fn unknown_role_string_has_no_access() {
        let parse = |s: &str| s.parse::<UserRole>().ok();
        assert!(!check_access(parse("Owner"), Agent));
        assert!(!check_access(parse("admin"), Agent));
        assert!(check_access(parse("Admin"), Agent));
    }
}
