//! CLI showcase commands: a checklist printer and a scripted conversation
//! that exercises the real dispatcher with the offline collaborators.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;

use visa_ai::conversation::{
    generate_checklist, ConversationService, CountryCode, SessionPolicy, SessionStore, UserId,
    VisaType,
};
use visa_ai::error::AppError;

use crate::infra::offline_collaborators;

#[derive(Args, Debug)]
pub(crate) struct ChecklistArgs {
    /// Destination country (canada, australia, uk)
    #[arg(long)]
    pub(crate) country: String,
    /// Visa route slug, e.g. express-entry or study-permit
    #[arg(long = "visa-type")]
    pub(crate) visa_type: String,
    /// Emit JSON instead of a text listing
    #[arg(long, default_value_t = false)]
    pub(crate) json: bool,
}

pub(crate) fn print_checklist(args: ChecklistArgs) -> Result<(), AppError> {
    let country = CountryCode::new(&args.country);
    let visa_type = VisaType::parse(&args.visa_type).unwrap_or(VisaType::StudyPermit);
    let checklist = generate_checklist(&country, visa_type);

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&checklist).map_err(std::io::Error::other)?
        );
        return Ok(());
    }

    println!("Documents for {} ({}):", visa_type.slug(), country);
    for document in &checklist.documents {
        println!("  - {document}");
    }
    println!("\nNotes:");
    for note in &checklist.notes {
        println!("  - {note}");
    }
    Ok(())
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Destination country for the scripted applicant
    #[arg(long, default_value = "canada")]
    pub(crate) country: String,
    /// Verify every checklist document instead of just the first two
    #[arg(long, default_value_t = false)]
    pub(crate) full: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = Arc::new(SessionStore::new(SessionPolicy::default()));
    let service = ConversationService::new(
        store,
        offline_collaborators(),
        Duration::from_secs(10),
    );
    let user = UserId("+15550100".to_string());

    let intro = format!(
        "I am 30 years old with a bachelor degree, 8 years of experience, heading to {} with $20000 saved",
        args.country
    );

    turn(&service, &user, "Hello!").await;
    turn(&service, &user, &intro).await;

    let state = service
        .store()
        .peek(&user)
        .ok_or_else(|| std::io::Error::other("demo conversation was not persisted"))?;

    if let (Some(country), Some(visa_type)) =
        (state.profile.preferred_country.clone(), state.profile.visa_type)
    {
        let checklist = generate_checklist(&country, visa_type);
        let documents: Vec<&'static str> = if args.full {
            checklist.documents.clone()
        } else {
            checklist.documents.iter().copied().take(2).collect()
        };
        for document in documents {
            turn(&service, &user, document).await;
        }

        if args.full {
            turn(&service, &user, "Please submit my application.").await;
            turn(&service, &user, "I chose it for the strong job market and my cousin lives there.").await;
        }
    }

    Ok(())
}

async fn turn(service: &ConversationService, user: &UserId, message: &str) {
    println!("you > {message}");
    let reply = service.handle_message(message, user).await;
    println!("bot > {reply}\n");
}
