pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "apctl")]
#[command(about = "AccessPoint Control operator CLI")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Provision and manage users allowed to sign in")]
    Usuario {
        #[command(subcommand)]
        cmd: commands::usuario::UsuarioCommands,
    },

    #[command(about = "Geography backup and restore")]
    Geografia {
        #[command(subcommand)]
        cmd: commands::geografia::GeografiaCommands,
    },

    #[command(about = "Import empresas from a CSV file")]
    Importar {
        #[arg(long, help = "CSV file with a header row (nombre,rut,giro,telefono,correo)")]
        file: std::path::PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Migrate => commands::migrate::handle(output_format).await,
        Commands::Usuario { cmd } => commands::usuario::handle(cmd, output_format).await,
        Commands::Geografia { cmd } => commands::geografia::handle(cmd, output_format).await,
        Commands::Importar { file } => commands::importar::handle(file, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_geography_restore() {
        let cli = Cli::try_parse_from(["apctl", "--json", "geografia", "restore", "--input", "geo.json"]).unwrap();
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Geografia { .. }));
    }

    #[test]
    fn parses_user_creation_with_role() {
        let cli = Cli::try_parse_from([
            "apctl", "usuario", "crear", "--email", "ana@accesspoint.cl", "--nombre", "Ana", "--rol", "admin",
        ])
        .unwrap();
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Text);
        assert!(matches!(cli.command, Commands::Usuario { .. }));
    }

    #[test]
    fn importar_requires_file() {
        assert!(Cli::try_parse_from(["apctl", "importar"]).is_err());
    }
}
