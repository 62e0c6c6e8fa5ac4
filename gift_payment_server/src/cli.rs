use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // We don't expect any CLI args, so always print the help
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Be explicit about which envars to print, so as to avoid accidentally exposing secrets
    const DISPLAY_ENVS: [&str; 14] = [
        "RUST_LOG",
        "GNP_HOST",
        "GNP_PORT",
        "GNP_DATABASE_URL",
        "GNP_FRONTEND_URL",
        "GNP_USE_X_FORWARDED_FOR",
        "GNP_USE_FORWARDED",
        "GNP_MOMO_PARTNER_CODE",
        "GNP_MOMO_ENDPOINT",
        "GNP_VNPAY_TMN_CODE",
        "GNP_VNPAY_PAY_URL",
        "GNP_SEPAY_TOKEN_CHECKS",
        "GNP_VIETQR_BANK_ID",
        "GNP_MAIL_WEBHOOK_URL",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
