//! xn-inspect - Browse XN container internals without a game build
//!
//! # Usage
//!
//! ```bash
//! # Section listing and relocation summary
//! xn-inspect chr_sonic.xno
//!
//! # Force a variant for files with no telling extension (YNO)
//! xn-inspect chr_sonic.bin --variant yno
//!
//! # Layout tree of everything the readers touched
//! xn-inspect chr_sonic.gno --trace
//!
//! # Bytes nothing read, and the offset-table cross-check
//! xn-inspect chr_sonic.gno --coverage --audit
//! ```

use anyhow::{Context, Result};
use clap::Parser;

use nether_xn::{FormatVariant, Section, XnContainer};

/// Inspect XN containers: sections, relocations, coverage and tracing
#[derive(Parser)]
#[command(name = "xn-inspect")]
#[command(about = "Inspect XN containers (XNO/ZNO/INO/GNO/ENO/YNO)")]
#[command(version)]
struct Cli {
    /// Container file to open
    path: String,

    /// Variant override (xno/zno/ino/gno/eno/yno); detected from the
    /// extension when omitted
    #[arg(long)]
    variant: Option<FormatVariant>,

    /// Print the byte-range tracing tree
    #[arg(long)]
    trace: bool,

    /// Print byte ranges no reader touched
    #[arg(long)]
    coverage: bool,

    /// Cross-check the offset table against the addresses actually read
    #[arg(long)]
    audit: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let container = XnContainer::open_with(&cli.path, cli.variant)
        .with_context(|| format!("reading container {}", cli.path))?;

    print_summary(&container);

    if cli.trace {
        print_trace(&container);
    }
    if cli.coverage {
        print_coverage(&container);
    }
    if cli.audit {
        print_audit(&container);
    }

    Ok(())
}

fn print_summary(container: &XnContainer) {
    let variant = container.variant();
    println!("Variant:  {}", variant.name());
    println!("Name:     {}", container.footer.name);
    println!("Sections: {}", container.sections().len());
    println!();

    println!("{:<8} {:<8} {:>10} {:>10}", "tag", "kind", "head", "size");
    for section in container.sections() {
        let tag = section.tag(variant);
        let header = section.header();
        println!(
            "{:<8} {:<8} {:>10} {:>10}",
            String::from_utf8_lossy(&tag),
            section.kind_name(),
            format!("{:#x}", header.head),
            header.size,
        );
        if let Section::Texture(texture) = section {
            for (name, flags) in texture.names.iter().zip(&texture.flags) {
                println!("         texture unit: {name} (flags {flags:#x})");
            }
        }
    }
    println!();
    println!(
        "Relocations: {} entries from root {:#x}",
        container.offset_table.entries.len(),
        container.info.root_node_address,
    );
}

fn print_trace(container: &XnContainer) {
    let Some(tree) = container.build_trace() else {
        return;
    };
    println!();
    println!("Trace:");
    for node in tree.flatten() {
        println!(
            "{:indent$}{} [{:#x}..{:#x})",
            "",
            node.label,
            node.start,
            node.end,
            indent = node.depth as usize * 2,
        );
    }
}

fn print_coverage(container: &XnContainer) {
    let gaps = container.unread_ranges();
    let total: u32 = gaps.iter().map(|(start, end)| end - start).sum();
    println!();
    println!("Unread: {} bytes in {} ranges", total, gaps.len());
    for (start, end) in gaps {
        println!("  {start:#x}..{end:#x}");
    }
}

fn print_audit(container: &XnContainer) {
    let audit = container.offset_table_audit();
    println!();
    println!("Offsets never read: {}", audit.unread_entries.len());
    for entry in &audit.unread_entries {
        println!("  {entry:#x}");
    }
    println!("Reads missing from the table: {}", audit.untabled_reads.len());
    for (position, site) in &audit.untabled_reads {
        println!("  {position:#x} read at {site}");
    }
}
