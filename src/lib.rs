//! Public entry-points for use by the CLI **and** the test-harness.

pub mod translator;

use translator::codegen::CodeWriter;
use translator::parser;
use translator::TranslateError;

/// Translate `(module name, source)` pairs into a single assembly listing.
/// When `bootstrap` is set, the listing opens with the stack-pointer init
/// and the call to `Sys.init`.
pub fn translate(modules: &[(&str, &str)], bootstrap: bool) -> Result<Vec<String>, TranslateError> {
    let mut writer = CodeWriter::new();
    let mut output = Vec::new();

    if bootstrap {
        output.extend(writer.write_bootstrap());
    }
    for (name, source) in modules {
        writer.set_module(name);
        for line in source.lines() {
            if let Some(command) = parser::parse_line(line)? {
                output.extend(writer.write(&command)?);
            }
        }
    }
    Ok(output)
}
