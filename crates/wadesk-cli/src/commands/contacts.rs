//! Contact commands.

use clap::Args;
use std::path::Path;
use wadesk_core::{Contact, ContactFilter, ContactStatus};
use wadesk_store::Store;

use super::{load_config, open_store};

/// Contacts command arguments.
#[derive(Args)]
pub struct ContactsArgs {
    #[command(subcommand)]
    pub command: ContactsCommand,
}

#[derive(clap::Subcommand)]
pub enum ContactsCommand {
    /// List contacts, newest first
    List {
        /// Only contacts with this status
        #[arg(long)]
        status: Option<String>,

        /// Case-insensitive search over name and phone
        #[arg(long)]
        search: Option<String>,
    },

    /// Change a contact's status
    SetStatus {
        /// Contact id
        id: String,

        /// interesado, inscrito, rechazado or reagendados
        status: String,
    },
}

/// Run the contacts command.
pub async fn run(config_path: Option<&Path>, args: ContactsArgs) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config, false).await?;
    execute(store.as_ref(), args.command).await
}

pub(crate) async fn execute(store: &dyn Store, command: ContactsCommand) -> anyhow::Result<()> {
    match command {
        ContactsCommand::List { status, search } => {
            let filter = ContactFilter {
                status: status
                    .as_deref()
                    .map(str::parse::<ContactStatus>)
                    .transpose()?,
                search,
            };
            let contacts = store.list_contacts(&filter).await?;
            if contacts.is_empty() {
                println!("No contacts found.");
            }
            for contact in &contacts {
                println!("{}", format_contact(contact));
            }
        }

        ContactsCommand::SetStatus { id, status } => {
            let status: ContactStatus = status.parse()?;
            match store.update_contact_status(&id, status).await? {
                Some(contact) => println!("{} is now {}", contact.name, contact.status),
                None => anyhow::bail!("Contact not found: {}", id),
            }
        }
    }
    Ok(())
}

fn format_contact(contact: &Contact) -> String {
    format!(
        "{}  {:<12} {:<16} {}",
        contact.id,
        contact.status.as_str(),
        contact.phone,
        contact.name
    )
}
