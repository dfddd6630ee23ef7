//! CloudFormation templates and where they live in the template bucket

/// A template body plus the file name it was loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    file_name: String,
    body: String,
}

impl Template {
    pub fn new(file_name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            body: body.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// First 16 hex characters of the blake3 hash of the body
    pub fn digest(&self) -> String {
        let hash = blake3::hash(self.body.as_bytes());
        hex::encode(&hash.as_bytes()[..8])
    }

    /// `<deployment>/<stack id>/<digest>-<file name>`
    pub fn object_key(&self, deployment_name: &str, stack_id: &str) -> String {
        format!(
            "{}/{}/{}-{}",
            deployment_name,
            stack_id,
            self.digest(),
            self.file_name
        )
    }
}

/// Virtual-hosted-style URL CloudFormation can fetch the template from
pub fn template_url(bucket: &str, region: &str, key: &str) -> String {
    format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_is_content_addressed() {
        let a = Template::new("main.yml", "Resources: {}\n");
        let b = Template::new("main.yml", "Resources: {}\n");
        let c = Template::new("main.yml", "Parameters: {}\nResources: {}\n");

        assert_eq!(a.digest().len(), 16);
        assert_eq!(
            a.object_key("customized_pages", "main"),
            b.object_key("customized_pages", "main")
        );
        assert_ne!(a.digest(), c.digest());
        assert!(a
            .object_key("customized_pages", "main")
            .starts_with("customized_pages/main/"));
        assert!(a.object_key("customized_pages", "main").ends_with("-main.yml"));
    }

    #[test]
    fn test_template_url() {
        assert_eq!(
            template_url("openstax-cfn-templates", "us-east-1", "hosted_edited/hosted_edited/abc-hosted_edited.yml"),
            "https://openstax-cfn-templates.s3.us-east-1.amazonaws.com/hosted_edited/hosted_edited/abc-hosted_edited.yml"
        );
    }
}
