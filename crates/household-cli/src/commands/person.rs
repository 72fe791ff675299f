//! Household member commands.

use chrono::Utc;
use clap::Subcommand;
use household_core::{HouseholdDb, Person, PersonRepository};

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum PersonAction {
    /// Add a household member
    Add {
        /// Display name
        name: String,
        /// Color as #rgb or #rrggbb
        #[arg(long)]
        color: Option<String>,
        /// Avatar (emoji or image reference)
        #[arg(long)]
        avatar: Option<String>,
    },
    /// List household members
    List,
    /// Show one member
    Get {
        /// Person ID
        id: String,
    },
    /// Update a member
    Update {
        /// Person ID
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
        /// New avatar; pass an empty string to clear it
        #[arg(long)]
        avatar: Option<String>,
    },
    /// Remove a member
    Remove {
        /// Person ID
        id: String,
    },
}

pub fn run(action: PersonAction) -> CmdResult {
    let db = HouseholdDb::open()?;

    match action {
        PersonAction::Add {
            name,
            color,
            avatar,
        } => {
            let person = Person::new(&name, color.as_deref(), avatar, Utc::now())?;
            db.create_person(&person)?;
            print_json(&person)?;
        }
        PersonAction::List => {
            print_json(&db.list_people()?)?;
        }
        PersonAction::Get { id } => match db.get_person(&id)? {
            Some(person) => print_json(&person)?,
            None => return Err(format!("person not found: {id}").into()),
        },
        PersonAction::Update {
            id,
            name,
            color,
            avatar,
        } => {
            let mut person = db
                .get_person(&id)?
                .ok_or_else(|| format!("person not found: {id}"))?;

            if let Some(n) = name {
                person.set_name(&n)?;
            }
            if let Some(c) = color {
                person.set_color(&c)?;
            }
            if let Some(a) = avatar {
                person.avatar = Some(a).filter(|a| !a.trim().is_empty());
            }

            db.update_person(&person)?;
            print_json(&person)?;
        }
        PersonAction::Remove { id } => {
            db.delete_person(&id)?;
            println!("Person removed: {id}");
        }
    }
    Ok(())
}
