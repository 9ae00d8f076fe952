use admin_client::retry::DEFAULT_MAX_RETRIES;
use admin_client::{RolePayload, UserPayload};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(author, version, about = "Users and roles administration console", long_about = None)]
pub struct Args {
    /// Base URL of the admin API
    #[arg(long, env = "ADMIN_API_URL")]
    pub api_url: Option<String>,

    /// Extra attempts for failed requests
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    pub retries: u32,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage users
    Users {
        #[command(subcommand)]
        action: UserCommand,
    },
    /// Manage roles
    Roles {
        #[command(subcommand)]
        action: RoleCommand,
    },
    /// Interactive search and paging over a list
    Browse {
        #[arg(value_enum)]
        target: BrowseTarget,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseTarget {
    Users,
    Roles,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ListArgs {
    /// Filter by name
    #[arg(short, long)]
    pub search: Option<String>,

    #[arg(short, long, default_value_t = 1)]
    pub page: u32,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct UserFields {
    #[arg(long)]
    pub first: Option<String>,

    #[arg(long)]
    pub last: Option<String>,

    #[arg(long)]
    pub role_id: Option<String>,

    /// Avatar URL
    #[arg(long)]
    pub photo: Option<String>,
}

impl From<UserFields> for UserPayload {
    fn from(fields: UserFields) -> Self {
        UserPayload {
            first: fields.first,
            last: fields.last,
            role_id: fields.role_id,
            photo: fields.photo,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    List(ListArgs),
    Get {
        id: String,
    },
    Create(UserFields),
    Update {
        id: String,
        #[command(flatten)]
        fields: UserFields,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum RoleCommand {
    List(ListArgs),
    Get {
        id: String,
    },
    Create {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Make the new role the default one
        #[arg(long)]
        default: bool,
    },
    Update {
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },
    SetDefault {
        id: String,
    },
    Delete {
        id: String,
    },
}

impl RoleCommand {
    pub fn payload(name: Option<String>, description: Option<String>, default: bool) -> RolePayload {
        RolePayload {
            name,
            description,
            is_default: default.then_some(true),
        }
    }
}
