//! Naming conventions for domains, zones and buckets

const PRODUCTION_ENV: &str = "production";
const ROOT_DOMAIN: &str = "openstax.org";
const SANDBOX_DOMAIN: &str = "sandbox.openstax.org";
const SUBDOMAIN_PREFIX: &str = "customized";
const BUCKET_SUFFIX: &str = "customized-pages";

/// Route53 zone for the account
pub fn hosted_zone_name(in_aws_sandbox: bool) -> &'static str {
    if in_aws_sandbox {
        SANDBOX_DOMAIN
    } else {
        ROOT_DOMAIN
    }
}

/// `customized[-<env>].<zone>`; the env segment is left out for production
pub fn domain(env_name: &str, in_aws_sandbox: bool) -> String {
    let subdomain = join_present(&[
        Some(SUBDOMAIN_PREFIX),
        (env_name != PRODUCTION_ENV).then_some(env_name),
    ]);

    format!("{}.{}", subdomain, hosted_zone_name(in_aws_sandbox))
}

/// `<env>[-sandbox]-customized-pages`
pub fn bucket_name(env_name: &str, in_aws_sandbox: bool) -> String {
    join_present(&[
        Some(env_name),
        in_aws_sandbox.then_some("sandbox"),
        Some(BUCKET_SUFFIX),
    ])
}

/// Join the present, non-empty segments with `-`
fn join_present(segments: &[Option<&str>]) -> String {
    segments
        .iter()
        .flatten()
        .filter(|segment| !segment.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sandbox_domain_includes_env() {
        for env in ["qa", "dev", "staging", "demo-1"] {
            assert_eq!(
                domain(env, true),
                format!("customized-{}.sandbox.openstax.org", env)
            );
        }
    }

    #[test]
    fn test_production_domain() {
        assert_eq!(domain("production", false), "customized.openstax.org");
        assert_eq!(domain("production", true), "customized.sandbox.openstax.org");
        assert_eq!(domain("staging", false), "customized-staging.openstax.org");
    }

    #[test]
    fn test_bucket_name() {
        for env in ["qa", "production", "staging"] {
            assert_eq!(
                bucket_name(env, true),
                format!("{}-sandbox-customized-pages", env)
            );
            assert_eq!(bucket_name(env, false), format!("{}-customized-pages", env));
        }
    }

    #[test]
    fn test_empty_segments_are_dropped() {
        assert_eq!(bucket_name("", true), "sandbox-customized-pages");
        assert_eq!(domain("", false), "customized.openstax.org");
    }

    #[test]
    fn test_hosted_zone_name() {
        assert_eq!(hosted_zone_name(true), "sandbox.openstax.org");
        assert_eq!(hosted_zone_name(false), "openstax.org");
    }
}
