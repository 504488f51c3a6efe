use serde::Serialize;
use taskboard_domain::{Task, TaskStatus};

use crate::context::CliContext;
use crate::output;

#[derive(Serialize)]
struct ColumnView<'a> {
    status: TaskStatus,
    count: usize,
    tasks: &'a [Task],
}

pub fn handle_board(ctx: &CliContext) -> anyhow::Result<()> {
    let board = ctx.board();
    let columns: Vec<ColumnView<'_>> = board
        .columns()
        .map(|(status, tasks)| ColumnView {
            status,
            count: tasks.len(),
            tasks,
        })
        .collect();
    output::output_success(serde_json::json!({
        "project_id": ctx.project_id,
        "columns": columns,
    }))
}

pub fn handle_summary(ctx: &CliContext) -> anyhow::Result<()> {
    output::output_success(ctx.board().summary())
}
