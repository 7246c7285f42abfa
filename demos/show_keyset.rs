//! Example: print a keyset with its identities and signatures
//!
//! Run with: cargo run --example show_keyset -- 0xE6AA90171392B174

use gnupg_keyset::{Key, Keyring, TrustLevel};

#[tokio::main]
async fn main() -> gnupg_keyset::Result<()> {
    let Some(keyid) = std::env::args().nth(1) else {
        eprintln!("usage: show_keyset <key id>");
        std::process::exit(2);
    };

    let keyring = Keyring::new();
    let keyset = keyring.keyset(&keyid).await?;

    let Some(primary) = &keyset.primary_key else {
        println!("no primary key found for {keyid}");
        return Ok(());
    };

    println!("{}", format_key(primary));
    for uid in &primary.identities {
        println!(
            "  uid {} {}",
            trust_marker(uid.trust),
            format_uid(&uid.name, &uid.comment, &uid.email)
        );
        for sig in keyring.identity_signatures(uid).await? {
            println!("      sig {} {}", sig.signing_key_id, sig.name);
        }
    }
    for uat in &primary.attributes {
        let short = &uat.hash[..8.min(uat.hash.len())];
        println!("  uat {} [attribute {}]", trust_marker(uat.trust), short);
    }
    for subkey in &keyset.subkeys {
        println!("{}", format_key(subkey));
    }

    Ok(())
}

fn trust_marker(trust: TrustLevel) -> &'static str {
    match trust {
        TrustLevel::Ultimate => "[U]",
        TrustLevel::Full => "[F]",
        TrustLevel::Marginal => "[M]",
        TrustLevel::Never => "[N]",
        TrustLevel::Expired => "[E]",
        TrustLevel::Revoked => "[R]",
        TrustLevel::Disabled => "[D]",
        TrustLevel::Invalid => "[I]",
        TrustLevel::Undefined => "[?]",
        TrustLevel::UnknownNew | TrustLevel::Unknown => "[-]",
    }
}

fn format_uid(name: &str, comment: &str, email: &str) -> String {
    if comment.is_empty() {
        format!("{name} <{email}>")
    } else {
        format!("{name} ({comment}) <{email}>")
    }
}

fn format_key(key: &Key) -> String {
    let label = if key.is_primary() { "pub" } else { "sub" };
    let expires = key
        .expires()
        .map(|d| format!(" expires {}", d.date_naive()))
        .unwrap_or_default();

    format!(
        "{} {} {}{}/{}{}\n    {}",
        label,
        trust_marker(key.trust),
        key.algorithm,
        key.bits,
        key.id,
        expires,
        key.fingerprint
    )
}
