//! Binary that emits command-line options markdown to stdout.
//!
//! Pipe it into the command-line options reference.

fn main() {
    print!("{}", scoutplot_cli::render_options_markdown());
}
