use taskboard_domain::{NewTask, TaskId, TaskQuery, TaskSort, TaskStatus};

use crate::cli::{AddArgs, ListArgs, MoveArgs};
use crate::context::CliContext;
use crate::output;

pub async fn handle_list(ctx: &CliContext, args: ListArgs) -> anyhow::Result<()> {
    let mut query = TaskQuery::all();
    if let Some(status) = args.status {
        query = query.status(status.parse::<TaskStatus>()?);
    }
    if args.ceo {
        query = query.ceo_questions(true);
    }
    if let Some(sort) = args.sort {
        query = query.sorted(sort.parse::<TaskSort>()?);
    }
    if let Some(limit) = args.limit {
        query = query.limit(limit);
    }
    output::output_list(ctx.list(query).await?)
}

pub async fn handle_add(ctx: &CliContext, args: AddArgs) -> anyhow::Result<()> {
    let status: TaskStatus = args.status.parse()?;
    let order = match args.order {
        Some(order) => order,
        None => i32::try_from(ctx.board().column(status).len())?,
    };

    let mut task = NewTask::new(ctx.project_id.clone(), ctx.workspace_id.clone(), args.title)
        .with_status(status)
        .with_order(order);
    task.description = args.description;
    task.assignees = args.assignees;
    task.platforms = args.platforms;
    task.is_ceo_question = args.ceo;

    let created = ctx.session().create_task(task).await?;
    output::output_success(&created)
}

pub async fn handle_move(ctx: &CliContext, args: MoveArgs) -> anyhow::Result<()> {
    let column: TaskStatus = args.to.parse()?;
    let (task, signals) = ctx
        .move_task(&TaskId::new(args.id), column, args.index)
        .await?;
    output::output_success(serde_json::json!({
        "task": task,
        "signals": signals,
    }))
}

pub async fn handle_complete(ctx: &CliContext, id: String) -> anyhow::Result<()> {
    handle_move(
        ctx,
        MoveArgs {
            id,
            to: TaskStatus::Done.to_string(),
            index: None,
        },
    )
    .await
}

pub async fn handle_ceo(ctx: &CliContext, id: String, flag: bool) -> anyhow::Result<()> {
    let id = TaskId::new(id);
    if let Some(write) = ctx.session().set_ceo_question(&id, flag)? {
        write.wait().await?;
    }
    let task = ctx
        .session()
        .tasks()
        .into_iter()
        .find(|t| t.id == id)
        .ok_or_else(|| anyhow::anyhow!("Task not found: {}", id))?;
    output::output_success(&task)
}

pub async fn handle_rm(ctx: &CliContext, id: String) -> anyhow::Result<()> {
    let id = TaskId::new(id);
    ctx.session().delete_task(&id).await?;
    output::output_success(serde_json::json!({ "deleted": id }))
}
