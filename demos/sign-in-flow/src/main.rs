use latchkey::prelude::*;

// ---------------------------------------------------------------------------
// Demo account
// ---------------------------------------------------------------------------

const DEMO_PHONE: &str = "+15555550100";
const DEMO_PIN: &str = "24680";

fn demo_account() -> Result<CredentialRecord, LatchkeyError> {
    let identity = Identity {
        id: UserId::new("1")?,
        name: "Demo User".into(),
        email: "demo@example.com".into(),
        phone: DEMO_PHONE.into(),
    };
    Ok(CredentialRecord::new(identity, DEMO_PIN))
}

fn newcomer() -> SignUpDetails {
    SignUpDetails {
        name: "Jo Newcomer".into(),
        email: "jo@example.com".into(),
        phone: "+15555550123".into(),
        pin: "13579".into(),
    }
}

// ---------------------------------------------------------------------------
// Walkthrough
// ---------------------------------------------------------------------------

/// Plays one launch of the app: a signed-in user is signed out, a
/// signed-out one goes through the sign-in and sign-up screens.
async fn walkthrough(session: &Latchkey) -> Result<(), LatchkeyError> {
    if let Some(identity) = session.identity() {
        println!("welcome back, {} (id {})", identity.name, identity.id);
        session.sign_out().await;
        println!("signed out; run again to sign in");
        return Ok(());
    }

    let phone = session
        .stored_phone_number()
        .await
        .unwrap_or_else(|| DEMO_PHONE.to_string());
    println!("sign-in screen, phone pre-filled: {phone}");

    match session.sign_in(&phone, "00000").await {
        Ok(_) => println!("unexpected: wrong PIN accepted"),
        Err(e) => println!("wrong PIN: {e}"),
    }

    let newcomer = newcomer();
    if let Err(errors) = newcomer.validate() {
        println!("sign-up form invalid: {errors}");
        return Ok(());
    }
    match session.sign_up(&newcomer).await {
        Ok(identity) => println!("registered {} as id {}", identity.name, identity.id),
        Err(AuthError::UserExists) => {
            println!("{}", AuthError::UserExists);
            let identity = session.sign_in(DEMO_PHONE, DEMO_PIN).await?;
            println!("signed in as {}", identity.name);
        }
        Err(e) => return Err(e.into()),
    }

    println!("state: {}", session.state());
    Ok(())
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = LatchkeyConfig::default().with_env();
    latchkey::logging::init(&config.log_filter);

    let data_dir = std::env::temp_dir().join("latchkey-demo");
    if config.store_dir.is_none() {
        config.store_dir = Some(data_dir.join("session"));
    }
    if config.credentials_file.is_none() {
        config.credentials_file = Some(data_dir.join("users.json"));
    }
    tracing::info!(
        store_dir = ?config.store_dir,
        credentials_file = ?config.credentials_file,
        "starting sign-in demo"
    );

    let session = LatchkeyBuilder::new()
        .config(config)
        .seed(demo_account()?)
        .build()
        .await?;

    walkthrough(&session).await?;
    Ok(())
}
