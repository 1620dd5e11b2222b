fn valid_kube_name(name: &str) -> String {
    name.to_lowercase().replace('_', "-")
}

pub fn deployment_name_for_app(app_name: &str, process: &str) -> String {
    format!("{}-{}", valid_kube_name(app_name), valid_kube_name(process))
}

pub fn deploy_pod_name_for_app(app_name: &str) -> String {
    format!("{}-deploy", valid_kube_name(app_name))
}

pub fn exec_command_pod_name_for_app(app_name: &str) -> String {
    format!("{}-isolated-run", valid_kube_name(app_name))
}

/// An empty pool means the node container runs on every node.
pub fn daemon_set_name(name: &str, pool: &str) -> String {
    let name = valid_kube_name(name);

    if pool.is_empty() {
        format!("node-container-{name}-all")
    } else {
        format!("node-container-{name}-pool-{}", valid_kube_name(pool))
    }
}
