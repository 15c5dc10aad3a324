use std::env;
use std::path::PathBuf;

pub const HOME_ENV: &str = "VAULT_UPKEEP_HOME";

fn fallback_dotenv_path(
    upkeep_home: Option<PathBuf>,
    config_dir: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(home) = upkeep_home {
        return Some(home.join(".env"));
    }
    Some(config_dir?.join("vault-upkeep/.env"))
}

pub fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    let fallback = fallback_dotenv_path(
        env::var_os(HOME_ENV).map(PathBuf::from),
        dirs::config_dir(),
    );

    let Some(path) = fallback else {
        return;
    };
    if path.is_file() {
        let _ = dotenvy::from_path(&path);
    }
}
