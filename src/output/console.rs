//! Console output utilities.

use console::style;

use crate::extract::Descriptor;

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("INFO").cyan().bold(), message);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("OK").green().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", style("WARN").yellow().bold(), message);
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("ERROR").red().bold(), message);
}

/// Print the application banner.
pub fn print_banner() {
    let banner = r#"
╔═══════════════════════════════════════════════════════╗
║     Album Downloader                                  ║
║     Albums and files from media hosting sites         ║
╚═══════════════════════════════════════════════════════╝
"#;
    println!("{}", style(banner).cyan());
}

/// Print configuration summary.
pub fn print_config_summary(urls: &[String], output_dir: &str, collision_policy: &str) {
    println!();
    println!("{}", style("Configuration:").bold());
    println!("  URLs: {}", urls.join(", "));
    println!("  Directory: {}", output_dir);
    println!("  Existing files: {}", collision_policy);
    println!();
}

/// Print the registered extractors.
pub fn print_extractors<'a>(descriptors: impl Iterator<Item = &'a Descriptor>) {
    println!("{}", style("Supported sites:").bold());
    for descriptor in descriptors {
        println!(
            "  {:<18} {:<28} {}",
            style(descriptor.name()).green(),
            descriptor.base_url(),
            style(descriptor.description()).dim()
        );
    }
}
