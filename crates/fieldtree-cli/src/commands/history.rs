use crate::cli::HistoryArgs;
use crate::context::{AppContext, CliResult};
use crate::output::render_history;

pub(crate) fn handle_history(ctx: &AppContext, args: &HistoryArgs) -> CliResult<()> {
    let records: Vec<_> = ctx.prefs.recent(args.limit).collect();
    render_history(&records, ctx.output)
}
