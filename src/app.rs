//! Application orchestrator.
//! Loads/merges config, initializes logging, installs the signal handler, and
//! dispatches one subcommand onto the tree operations over the local backend.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{json, Value};
use std::io::Read;
use std::sync::{Arc, Mutex};
use tracing::{debug, error};

use scoped_tree::config::load_config_from_xml_path;
use scoped_tree::output as out;
use scoped_tree::{
    default_config_path, default_log_path, load_config, Config, LocalProvider, MkdirRequest, OpResult, OperationError,
    ReadRequest, RmdirRequest, RootGrant, ScopedTree, TransferRequest, WriteRequest,
};

use crate::cli::{Args, Command, TransferArgs, WriteArgs};
use crate::logging::init_tracing;

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    // Handle config-path before logging init
    if let Command::ConfigPath = args.command {
        let path = match &args.config {
            Some(p) => p.clone(),
            None => default_config_path()?,
        };
        out::print_user(&path.display().to_string());
        if !path.exists() {
            out::print_info("No config file exists there; built-in defaults apply.");
        }
        if let Ok(log) = default_log_path() {
            out::print_info(&format!("Suggested log file: {}", log.display()));
        }
        return Ok(());
    }

    // Build config (may read XML). CLI args override config values.
    let mut cfg = match &args.config {
        Some(p) => load_config_from_xml_path(p)?,
        None => load_config()?.unwrap_or_default(),
    };
    args.apply_overrides(&mut cfg);
    cfg.validate()?;

    // Initialize logging and capture the guard so we can drop it on signal
    let guard_opt = init_tracing(&cfg.log_level, cfg.log_file.as_deref(), cfg.json_logs)
        .inspect_err(|e| out::print_error(&format!("Failed to initialize logging: {e}")))?;

    // Guard needs to be dropped on SIGINT to flush logs
    let guard_slot = Arc::new(Mutex::new(guard_opt));
    {
        let guard_slot = Arc::clone(&guard_slot);
        ctrlc::set_handler(move || {
            out::print_warn("Received interrupt; flushing logs...");
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take(); // drop guard here to flush tracing_appender
            }
            std::process::exit(130);
        })
        .context("install signal handler")?;
    }

    debug!(?args, "starting scoped_tree");

    let result = dispatch(&cfg, &args);
    match &result {
        Ok(value) => out::print_user(&serde_json::to_string_pretty(value)?),
        Err(e) => match e.downcast_ref::<OperationError>() {
            Some(op_err) => {
                error!(code = op_err.code(), kind = op_err.kind().as_str(), op = %op_err.op, reason = %op_err.source, "operation rejected")
            }
            None => error!(error = ?e, "command failed"),
        },
    }

    // Ensure logs are flushed before exit
    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }

    result.map(|_| ())
}

/// Execute one subcommand and return its JSON result.
fn dispatch(cfg: &Config, args: &Args) -> Result<Value> {
    let tree = ScopedTree::with_options(LocalProvider::new(), cfg.tree.clone());
    let root = RootGrant::new(args.root.clone().unwrap_or_default());

    match &args.command {
        Command::Write(w) => done(tree.write_file(&root, &write_request(w)?)),
        Command::Append(w) => done(tree.append_file(&root, &write_request(w)?)),
        Command::Read { path, encoding } => {
            let mut req = ReadRequest::new(path.as_str());
            req.encoding = *encoding;
            to_json(tree.read_file(&root, &req))
        }
        Command::Mkdir { path, no_parents } => {
            done(tree.mkdir_with(&root, &MkdirRequest::new(path.as_str()).recursive(!*no_parents)))
        }
        Command::Rmdir { path, recursive } => {
            done(tree.rmdir(&root, &RmdirRequest::new(path.as_str()).recursive(*recursive)))
        }
        Command::Readdir { path } => to_json(tree.readdir(&root, path.as_deref())),
        Command::Stat { path } => to_json(tree.stat(&root, path)),
        Command::Exists { path } => to_json(tree.exists(&root, path)),
        Command::Delete { path } => done(tree.delete_file(&root, path)),
        Command::Move(t) => done(tree.move_file(&root, &transfer_request(t))),
        Command::Copy(t) => done(tree.copy_file(&root, &transfer_request(t))),
        Command::Uri { path } => to_json(tree.get_uri_for_path(&root, path)),
        Command::ConfigPath => Ok(Value::Null),
    }
}

fn write_request(w: &WriteArgs) -> Result<WriteRequest> {
    let data = match &w.data {
        Some(d) => d.clone(),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("read payload from stdin")?;
            buf
        }
    };
    let mut req = WriteRequest::new(w.path.as_str(), data);
    req.encoding = w.encoding;
    req.mime_type = w.mime_type.clone();
    Ok(req)
}

fn transfer_request(t: &TransferArgs) -> TransferRequest {
    TransferRequest::new(t.from.as_str(), t.to.as_str()).overwrite(t.overwrite)
}

fn to_json<T: Serialize>(res: OpResult<T>) -> Result<Value> {
    Ok(serde_json::to_value(res?)?)
}

fn done(res: OpResult<()>) -> Result<Value> {
    res?;
    Ok(json!({ "ok": true }))
}
