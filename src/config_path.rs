use directories::ProjectDirs;
use std::path::PathBuf;

/// `config.toml` in the platform config directory, if one can be found.
pub(crate) fn default_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "tallysheet")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::default_config_path;

    #[test]
    fn default_config_path_names_config_toml() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("config.toml"));
        }
    }
}
