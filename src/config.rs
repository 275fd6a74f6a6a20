use std::env::{self, VarError};
use thiserror::Error;

/// Connection parameters of the hosted record store
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Service URL without a trailing `/`
    pub url: Box<str>,
    pub anon_key: Box<str>,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub store: StoreConfig,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("`{0}` env variable is not set")]
    Missing(&'static str),
    #[error("`{0}` env variable is not a valid UTF-8 string")]
    NotUnicode(&'static str),
}

const URL_VARS: [&str; 2] = ["SUPABASE_URL", "EXPO_PUBLIC_SUPABASE_URL"];
const ANON_KEY_VARS: [&str; 2] = ["SUPABASE_ANON_KEY", "EXPO_PUBLIC_SUPABASE_ANON_KEY"];

#[allow(clippy::missing_errors_doc)]
pub fn read_config_from_env() -> Result<Config, ConfigError> {
    read_config(|name| env::var(name))
}

fn read_config(lookup: impl Fn(&str) -> Result<String, VarError>) -> Result<Config, ConfigError> {
    let url = required(&lookup, URL_VARS)?;
    let anon_key = required(&lookup, ANON_KEY_VARS)?;

    Ok(Config {
        store: StoreConfig {
            url: url.trim_end_matches('/').into(),
            anon_key: anon_key.into(),
        },
    })
}

/// First non-empty value among `names`, in order.
fn required(lookup: &impl Fn(&str) -> Result<String, VarError>, names: [&'static str; 2]) -> Result<String, ConfigError> {
    for name in names {
        match lookup(name) {
            Ok(val) if !val.trim().is_empty() => return Ok(val.trim().to_owned()),
            Ok(_) | Err(VarError::NotPresent) => {}
            Err(VarError::NotUnicode(_)) => return Err(ConfigError::NotUnicode(name)),
        }
    }

    Err(ConfigError::Missing(names[0]))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::{collections::HashMap, ffi::OsString};

    fn lookup_in(vars: &[(&str, &str)]) -> impl Fn(&str) -> Result<String, VarError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
        move |name| vars.get(name).cloned().ok_or(VarError::NotPresent)
    }

    #[test]
    fn test_reads_primary_names() {
        let config = read_config(lookup_in(&[
            ("SUPABASE_URL", "https://project.supabase.co/"),
            ("SUPABASE_ANON_KEY", "anon"),
        ]))
        .unwrap();

        assert_eq!(&*config.store.url, "https://project.supabase.co");
        assert_eq!(&*config.store.anon_key, "anon");
    }

    #[test]
    fn test_falls_back_to_expo_names() {
        let config = read_config(lookup_in(&[
            ("SUPABASE_URL", ""),
            ("EXPO_PUBLIC_SUPABASE_URL", "https://expo.supabase.co"),
            ("EXPO_PUBLIC_SUPABASE_ANON_KEY", "expo-anon"),
        ]))
        .unwrap();

        assert_eq!(&*config.store.url, "https://expo.supabase.co");
        assert_eq!(&*config.store.anon_key, "expo-anon");
    }

    #[test]
    fn test_missing_variable() {
        let err = read_config(lookup_in(&[("SUPABASE_URL", "https://project.supabase.co")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("SUPABASE_ANON_KEY"));
    }

    #[test]
    fn test_not_unicode_variable() {
        let err = read_config(|name| match name {
            "SUPABASE_URL" => Err(VarError::NotUnicode(OsString::from("bad"))),
            _ => Err(VarError::NotPresent),
        })
        .unwrap_err();
        assert_eq!(err, ConfigError::NotUnicode("SUPABASE_URL"));
    }
}
