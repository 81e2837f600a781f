use anyhow::{bail, Context};
use clap::Subcommand;

use crate::api::usuarios::{CreateUsuario, UpdateUsuario};
use crate::cli::utils::{output_success, print_fields};
use crate::cli::OutputFormat;
use crate::database::usuarios::{find_by_email, insert_usuario, list_activos, update_usuario};
use crate::database::DatabaseManager;
use crate::types::Rol;
use crate::validation::Validate;

#[derive(Subcommand)]
pub enum UsuarioCommands {
    #[command(about = "Provision a user")]
    Crear {
        #[arg(long)]
        email: String,
        #[arg(long)]
        nombre: String,
        #[arg(long, help = "ADMIN or TECNICO", default_value = "TECNICO")]
        rol: Rol,
    },

    #[command(about = "Change name, role or active flag of a user, by email")]
    Actualizar {
        #[arg(long)]
        email: String,
        #[arg(long)]
        nombre: Option<String>,
        #[arg(long)]
        rol: Option<Rol>,
        #[arg(long)]
        activo: Option<bool>,
    },

    #[command(about = "List active users")]
    Listar,
}

pub async fn handle(cmd: UsuarioCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::pool()?;

    match cmd {
        UsuarioCommands::Crear { email, nombre, rol } => {
            let input = CreateUsuario {
                email,
                nombre,
                rol: Some(rol),
            };
            if let Err(errors) = input.validate() {
                bail!("invalid user: {:?}", errors.into_inner());
            }
            let usuario = insert_usuario(&pool, &input).await.context("creating user")?;
            let data = serde_json::to_value(&usuario)?;
            if output_format == OutputFormat::Text {
                print_fields(&data);
            }
            output_success(output_format, &format!("User {} created", usuario.email), Some(data))
        }
        UsuarioCommands::Actualizar {
            email,
            nombre,
            rol,
            activo,
        } => {
            let Some(existing) = find_by_email(&pool, &email).await? else {
                bail!("no user with email {}", email);
            };
            let input = UpdateUsuario { nombre, rol, activo };
            if let Err(errors) = input.validate() {
                bail!("invalid update: {:?}", errors.into_inner());
            }
            let usuario = update_usuario(&pool, existing.id, &input).await.context("updating user")?;
            output_success(
                output_format,
                &format!("User {} updated", usuario.email),
                Some(serde_json::to_value(&usuario)?),
            )
        }
        UsuarioCommands::Listar => {
            let usuarios = list_activos(&pool).await?;
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&usuarios)?),
                OutputFormat::Text => {
                    for u in &usuarios {
                        println!("{:<8} {:<40} {}", u.rol.as_str(), u.email, u.nombre);
                    }
                }
            }
            Ok(())
        }
    }
}
