use std::env;

/// Node settings read at build time, with their defaults
///
/// The flag marks values that must not be echoed in build output.
const NODE_ENV: &[(&str, &str, bool)] = &[
    ("DEVICE_ID", "", false),
    ("MQTT_HOST", "", false),
    ("MQTT_PORT", "8883", false),
    ("MQTT_USER", "", false),
    ("MQTT_PASSWORD", "", true),
    ("IDENTITY_URL", "", false),
    ("PROBE_URL", "http://httpbin.org/get", false),
    ("TRANSPORT_POLICY", "verified_only", false),
];

fn main() {
    // Node configuration from environment variables (optional)
    // These are used as default values for NodeParams
    for (name, default, secret) in NODE_ENV {
        if let Ok(value) = env::var(name) {
            println!("cargo:rustc-env={}={}", name, value);
            if *secret {
                println!("cargo:warning=Using {} from environment (hidden)", name);
            } else {
                println!("cargo:warning=Using {} from environment: {}", name, value);
            }
        } else {
            println!("cargo:rustc-env={}={}", name, default);
        }
    }

    // Rerun if environment variables change
    for (name, _, _) in NODE_ENV {
        println!("cargo:rerun-if-env-changed={}", name);
    }
}
