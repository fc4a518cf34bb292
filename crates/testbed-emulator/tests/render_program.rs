//! Renders complete Mininet-WiFi programs and checks their shape.

use testbed_emulator::{launch, EmulatorConfig, MininetScript, PostBuildHook};
use testbed_topology::{interference, latency, Resolver, TopologyDescriptor};

fn render(topology: &TopologyDescriptor) -> String {
    let config = EmulatorConfig::default();
    let mut script = MininetScript::new();
    launch(
        &mut script,
        topology,
        &PostBuildHook::new(config.post_build_command),
    )
    .expect("render program");
    script.into_source()
}

/// Index of the first line starting with `prefix`, ignoring indentation.
fn line_of(src: &str, prefix: &str) -> usize {
    src.lines()
        .position(|l| l.trim_start().starts_with(prefix))
        .unwrap_or_else(|| panic!("no line starting with {prefix:?}"))
}

#[test]
fn program_sections_follow_lifecycle() {
    for resolver in [Resolver::Interference, Resolver::Latency] {
        for &id in resolver.valid_scenarios() {
            let src = render(&resolver.resolve(i64::from(id)).unwrap());

            let net = line_of(&src, "net = Mininet_wifi(");
            let controller = line_of(&src, "nodes[\"c0\"] = net.addController(");
            let last_switch = line_of(&src, "nodes[\"s9\"] = net.addSwitch(");
            let propagation = line_of(&src, "net.setPropagationModel(");
            let mobility = line_of(&src, "net.setMobilityModel(");
            let wifi = line_of(&src, "net.configureWifiNodes()");
            let link = line_of(&src, "net.addLink(");
            let build = line_of(&src, "net.build()");
            let start = line_of(&src, "nodes[\"c0\"].start()");
            let cli = line_of(&src, "CLI(net)");
            let stop = line_of(&src, "net.stop()");

            let order = [
                net,
                controller,
                last_switch,
                propagation,
                mobility,
                wifi,
                link,
                build,
                start,
                cli,
                stop,
            ];
            assert!(
                order.windows(2).all(|w| w[0] < w[1]),
                "{resolver:?}/{id}: out of order {order:?}"
            );
        }
    }
}

#[test]
fn rendering_is_deterministic() {
    let a = render(&interference::resolve(2).unwrap());
    let b = render(&interference::resolve(2).unwrap());
    assert_eq!(a, b);
}

#[test]
fn latency_program_changes_only_access_path_delays() {
    let fast = render(&latency::resolve(3).unwrap());
    let slow = render(&latency::resolve(7).unwrap());

    let differing: Vec<(&str, &str)> = fast
        .lines()
        .zip(slow.lines())
        .filter(|(a, b)| a != b)
        .collect();
    assert_eq!(differing.len(), 5, "{differing:#?}");
    for (a, b) in differing {
        assert!(a.starts_with("net.addLink(") && a.ends_with("delay=\"0.5ms\")"));
        assert!(b.starts_with("net.addLink(") && b.ends_with("delay=\"15ms\")"));
    }
}

#[test]
fn only_crowded_program_has_extra_stations_and_hook() {
    for id in 0..=2 {
        let src = render(&interference::resolve(id).unwrap());
        let stations = src.matches("net.addStation(").count();
        let hooks = src.matches("subprocess.call(").count();
        if id == 2 {
            assert_eq!((stations, hooks), (16, 1));
        } else {
            assert_eq!((stations, hooks), (1, 0));
        }
    }
}
