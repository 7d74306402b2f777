//! `dfsctl unc`: build a UNC path from its components.

use dfsctl_core::UncPath;

use crate::cli::{GlobalOpts, UncArgs};
use crate::error::CliError;
use crate::output;

use super::Context;

pub fn handle(args: &UncArgs, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let path = UncPath::join(&args.parts);
    if !path.is_well_formed() {
        return Err(CliError::Validation {
            field: "parts".into(),
            reason: format!("'{path}' needs at least a server and a share"),
        });
    }
    let out = output::render_single(ctx.format, &path, ToString::to_string, ToString::to_string)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
