// src/common/i18n.rs

use std::collections::HashMap;

pub const DEFAULT_LANG: &str = "en";

// (chave, inglês, português)
const MESSAGES: &[(&str, &str, &str)] = &[
    ("validation_failed", "One or more fields are invalid.", "Um ou mais campos são inválidos."),
    ("invalid_token", "Invalid or missing authentication token.", "Token de autenticação inválido ou ausente."),
    ("profile_inactive", "This profile is inactive.", "Este perfil está inativo."),
    ("forbidden", "The '{role}' role is required for this action.", "O papel '{role}' é necessário para esta ação."),
    ("not_found", "{resource} not found.", "{resource} não encontrado(a)."),
    ("already_exists", "{resource} already exists.", "{resource} já existe."),
    ("still_referenced", "{resource} is still referenced by other records.", "{resource} ainda é referenciado(a) por outros registros."),
    ("service_type_not_offered", "The selected vendor does not offer this service type.", "O fornecedor selecionado não oferece este tipo de serviço."),
    ("invalid_csv", "The CSV file could not be read: {detail}", "Não foi possível ler o arquivo CSV: {detail}"),
    ("internal_error", "An unexpected error occurred.", "Ocorreu um erro inesperado."),
];

/// Catálogo de mensagens traduzidas, indexado por idioma e chave.
#[derive(Debug, Clone)]
pub struct I18nStore {
    catalogs: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl I18nStore {
    pub fn new() -> Self {
        let mut en = HashMap::new();
        let mut pt = HashMap::new();
        for (key, en_msg, pt_msg) in MESSAGES {
            en.insert(*key, *en_msg);
            pt.insert(*key, *pt_msg);
        }

        let mut catalogs = HashMap::new();
        catalogs.insert("en", en);
        catalogs.insert("pt", pt);
        Self { catalogs }
    }

    /// Busca a mensagem no idioma pedido, cai para inglês e, por fim, devolve a própria chave.
    pub fn translate(&self, lang: &str, key: &str, args: &[(&str, &str)]) -> String {
        let template = self
            .catalogs
            .get(lang)
            .and_then(|catalog| catalog.get(key))
            .or_else(|| self.catalogs.get(DEFAULT_LANG).and_then(|catalog| catalog.get(key)))
            .copied()
            .unwrap_or(key);

        args.iter().fold(template.to_string(), |msg, (name, value)| {
            msg.replace(&format!("{{{name}}}"), value)
        })
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_with_arguments() {
        let store = I18nStore::new();
        let msg = store.translate("pt", "not_found", &[("resource", "Cliente")]);
        assert_eq!(msg, "Cliente não encontrado(a).");
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        let store = I18nStore::new();
        assert_eq!(
            store.translate("de", "profile_inactive", &[]),
            "This profile is inactive."
        );
    }

    #[test]
    fn unknown_key_is_returned_verbatim() {
        let store = I18nStore::new();
        assert_eq!(store.translate("en", "no_such_key", &[]), "no_such_key");
    }
}
