use std::process::ExitCode;
use clap::Parser;
use log::{error, info, LevelFilter};
use k8s_context_scheduler::error::SchedulerResult;
use k8s_context_scheduler::logger::StdoutLogger;
use k8s_context_scheduler::node::NodeInfo;
use k8s_context_scheduler::pod::Pod;
use k8s_context_scheduler::registry::Registry;
use k8s_context_scheduler::scheduler::Scheduler;
use k8s_context_scheduler::scheduler_config::SchedulerConfig;
use k8s_context_scheduler::scheduler_plugin::CycleContext;

/// Places the pods described in a config file onto its nodes.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Path to the YAML scheduler configuration.
    #[arg(short, long)]
    config: String,

    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

fn run(args: &Args) -> SchedulerResult<()> {
    let config = SchedulerConfig::from_file(&args.config)?;
    let mut scheduler = Scheduler::new(&config, &Registry::in_tree())?;

    for node_config in &config.nodes {
        for i in 0..node_config.count {
            scheduler.add_node(NodeInfo::new(format!("{}-{}", node_config.name_prefix, i),
                                             node_config.labels.clone(),
                                             node_config.cpu, node_config.memory));
        }
    }

    let mut uid = 0;
    for pod_config in &config.pods {
        for i in 0..pod_config.count {
            uid += 1;
            scheduler.add_pod(Pod::new(uid, format!("{}-{}", pod_config.name_prefix, i),
                                       pod_config.labels.clone(), pod_config.requested_cpu,
                                       pod_config.requested_memory, pod_config.priority_weight));
        }
    }

    let attempts = scheduler.run(&CycleContext::new());
    let scheduled = attempts.iter().filter(|attempt| attempt.result.is_ok()).count();
    info!("scheduled {} of {} pods, {} left unschedulable",
        scheduled, attempts.len(), scheduler.queue.unschedulable_len());
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(err) = StdoutLogger::init(args.log_level) {
        eprintln!("can't install logger: {}", err);
        return ExitCode::FAILURE;
    }
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
