//! List the format registry and which extensions bulk loading attempts

use model_loader::format::{FORMATS, FormatFlags};
use model_loader::{available_formats, native_load_extensions};

fn main() {
    println!("Registered formats ({}):", FORMATS.len());
    for desc in FORMATS {
        let wrapper = if desc.flags.contains(FormatFlags::THIN_WRAPPER) {
            " [wrapper]"
        } else {
            ""
        };
        println!(
            "  {} -> .{}{}",
            desc.name,
            desc.extensions.join(" ."),
            wrapper
        );
    }

    println!("All extensions: {:?}", available_formats());
    println!("Attempted by bulk loads: {:?}", native_load_extensions());
}
