//! Live Tree Demo: a simulated deployment rendered as a live action tree.
//!
//! Several workers build images in parallel while a deploy action waits on
//! them. One build is reused by two consumers through an anchor, a tool
//! streams log lines above the tree, and a sticky block shows the endpoints.
//!
//! Set `TASKLOG_LOG_ACTIONS=1` to keep completed actions in the scrollback,
//! and `RUST_LOG=tasklog=debug` to see the console's own diagnostics on stderr.

use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tasklog::{
    ActionError, ActionRecord, Arg, ConsoleConfig, ConsoleSink, OutputCategory, Progress,
    ResultData,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let sink = ConsoleSink::start(ConsoleConfig::from_env())?;
    let console = sink.console();

    let label = console.set_idle_label("press ctrl-c to exit");
    console.set_sticky_content("endpoints", "web  http://localhost:8080\napi  http://localhost:9090");

    let deploy = ActionRecord::new("deploy", "deploy")
        .with_human_readable("Deploying demo")
        .with_scope(["web", "api", "worker", "cron", "mailer"]);
    console.started(deploy.clone(), None);

    let workers: Vec<_> = ["web", "api", "worker"]
        .into_iter()
        .enumerate()
        .map(|(n, image)| {
            let console = console.clone();
            thread::spawn(move || {
                let id = format!("build-{image}");
                let build = ActionRecord::new(id.as_str(), "docker.build")
                    .with_parent("deploy")
                    .with_category("build")
                    .with_arg(Arg::new("image", image));

                let layers = 4 + n;
                let step = Arc::new(std::sync::atomic::AtomicUsize::new(0));
                let progress: Progress = {
                    let step = step.clone();
                    Arc::new(move || {
                        let done = step.load(std::sync::atomic::Ordering::Relaxed);
                        format!("{done}/{layers} layers")
                    })
                };
                console.started(build.clone(), Some(progress));

                for layer in 0..layers {
                    thread::sleep(Duration::from_millis(400));
                    step.store(layer + 1, std::sync::atomic::Ordering::Relaxed);
                    console.write_lines(
                        &id,
                        &format!("docker {image}"),
                        OutputCategory::Tool,
                        [format!("Step {}/{layers}: RUN make layer-{layer}", layer + 1)],
                    );
                }

                let error = (image == "worker").then(|| ActionError::regular("registry unavailable"));
                let results = ResultData::default().with(Arg::new("digest", format!("sha256:{n}abc")));
                console.done(ActionRecord { error, ..build }, results);
            })
        })
        .collect();

    // Two consumers share the same schema build.
    let schema = ActionRecord::new("schema", "schema.compile").with_parent("deploy");
    console.started(schema.clone(), None);
    for consumer in ["api-schema", "web-schema"] {
        console.started(
            ActionRecord::new(consumer, "wait")
                .with_parent("deploy")
                .with_anchor("schema"),
            None,
        );
    }
    thread::sleep(Duration::from_secs(2));
    console.done(schema, ResultData::default());
    for consumer in ["api-schema", "web-schema"] {
        console.done(
            ActionRecord::new(consumer, "wait").with_parent("deploy").with_anchor("schema"),
            ResultData::default(),
        );
    }

    for worker in workers {
        let _ = worker.join();
    }
    console.done(deploy, ResultData::default());
    console.instant(ActionRecord::new("summary", "deploy.summary").with_category("report"));

    thread::sleep(Duration::from_secs(1));
    label.restore();
    console.set_sticky_content("endpoints", "");
    sink.stop();
    Ok(())
}
