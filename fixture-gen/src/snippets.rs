// SPDX-FileCopyrightText: fixture-gen contributors
//
// SPDX-License-Identifier: MIT

// Multi-line shell blocks spliced into the generated BATS suites. Each one
// depends on the variant's authentication mode and on how the provider is
// installed.

use variants::{AuthMode, Variant};

use crate::RenderOptions;

pub fn auth_setup(variant: &Variant) -> String {
    let sa = variant.service_account();
    match variant.auth {
        AuthMode::Irsa => format!(
            r#"	log "Associating IAM OIDC provider"
	eksctl utils associate-iam-oidc-provider --cluster $CLUSTER_NAME --approve --region $REGION >&3 2>&1

	log "Creating IAM service account for IRSA"
	eksctl create iamserviceaccount \
		--name {sa} \
		--namespace $NAMESPACE \
		--cluster $CLUSTER_NAME \
		--attach-policy-arn arn:aws:iam::aws:policy/AmazonSSMReadOnlyAccess \
		--attach-policy-arn arn:aws:iam::aws:policy/AWSSecretsManagerClientReadOnlyAccess \
		--override-existing-serviceaccounts \
		--approve \
		--region $REGION >&3 2>&1"#
        ),
        AuthMode::PodIdentity => format!(
            r#"	log "Creating EKS Pod Identity addon"
	eksctl create addon --name eks-pod-identity-agent --cluster $CLUSTER_NAME --region $REGION >&3 2>&1

	log "Creating Pod Identity association"
	eksctl create podidentityassociation \
		--cluster $CLUSTER_NAME \
		--namespace $NAMESPACE \
		--region $REGION \
		--service-account-name {sa} \
		--role-arn $POD_IDENTITY_ROLE_ARN \
		--create-service-account true >&3 2>&1"#
        ),
    }
}

/// Undoes what [`auth_setup`] created outside the test namespace.
pub fn teardown_cleanup(variant: &Variant) -> String {
    match variant.auth {
        AuthMode::Irsa => String::new(),
        AuthMode::PodIdentity => format!(
            r#"	log "Deleting Pod Identity association"
	eksctl delete podidentityassociation --cluster $CLUSTER_NAME --namespace $NAMESPACE --service-account-name {} --region $REGION >&3 2>&1 || true"#,
            variant.service_account()
        ),
    }
}

pub fn install_method(variant: &Variant, options: &RenderOptions) -> String {
    if options.addon {
        let version_flag = options
            .addon_version
            .as_deref()
            .map(|v| format!(" --addon-version {v}"))
            .unwrap_or_default();
        return format!(
            r#"	log "Installing AWS Secrets Store CSI Driver Provider via EKS addon"
	aws eks create-addon --cluster-name $CLUSTER_NAME --addon-name aws-secrets-store-csi-driver-provider --configuration-values "file://addon_config_values.yaml"{version_flag} --region $REGION >&3 2>&1"#
        );
    }

    let kubeconfig = variant.kubeconfig_var();
    format!(
        r#"	log "Adding secrets-store-csi-driver Helm repository"
	helm repo add secrets-store-csi-driver https://kubernetes-sigs.github.io/secrets-store-csi-driver/charts

	log "Installing secrets-store-csi-driver via Helm"
	helm --kubeconfig=${kubeconfig} --namespace=$NAMESPACE install csi-secrets-store secrets-store-csi-driver/secrets-store-csi-driver --set enableSecretRotation=true --set rotationPollInterval=15s --set syncSecret.enabled=true
	if [[ $? -ne 0 ]]; then
		echo "Error: Helm install failed" >&2
		return 1
	fi"#
    )
}

pub fn pod_identity_param(variant: &Variant) -> String {
    match variant.auth {
        AuthMode::PodIdentity => "\n    usePodIdentity: \"true\"".to_string(),
        AuthMode::Irsa => String::new(),
    }
}

/// The addon pulls its own image, so only self-installed providers need
/// `PRIVREPO`.
pub fn privrepo_check(options: &RenderOptions) -> String {
    if options.addon {
        return String::new();
    }
    r#"if [[ -z "${PRIVREPO}" ]]; then
	echo "Error: PRIVREPO is not specified" >&2
	return 1
fi"#
    .to_string()
}

pub fn install_provider_test(variant: &Variant, options: &RenderOptions) -> String {
    if options.addon {
        return String::new();
    }
    let kubeconfig = variant.kubeconfig_var();
    format!(
        r#"@test "Install aws provider" {{
	log "Installing AWS provider"

	envsubst < $PROVIDER_YAML | kubectl --kubeconfig=${kubeconfig} apply -f -
	cmd="kubectl --kubeconfig=${kubeconfig} --namespace $NAMESPACE wait --for=condition=Ready --timeout=60s pod -l app=csi-secrets-store-provider-aws"
	wait_for_process $WAIT_TIME $SLEEP_TIME "$cmd"

	PROVIDER_POD=$(kubectl --kubeconfig=${kubeconfig} --namespace $NAMESPACE get pod -l app=csi-secrets-store-provider-aws -o jsonpath="{{.items[0].metadata.name}}")
	run kubectl --kubeconfig=${kubeconfig} --namespace $NAMESPACE get pod/$PROVIDER_POD
	assert_success

	log "AWS provider installation completed"
}}"#
    )
}
