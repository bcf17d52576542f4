//! deoptlint MCP Server
//!
//! Serves deoptlint's tools over stdio so MCP clients can lint and fix
//! JavaScript object literals.

use anyhow::Result;
use deoptlint_mcp::DeoptLintServer;
use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};

#[tokio::main]
async fn main() -> Result<()> {
    deoptlint::entry_point::init_tracing(false);

    let server = DeoptLintServer::new();
    let service = server.serve((stdin(), stdout())).await?;
    service.waiting().await?;

    Ok(())
}
