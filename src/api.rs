// API client module: a small blocking client for the gist REST API. It
// composes the splitter and the resolver into the four remote operations
// and interprets the responses.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::bundle::{self, FileBundle};
use crate::config::{Config, Credential, PER_PAGE};
use crate::error::{GistError, Result};
use crate::model::{Directory, Gist};
use crate::resolve::{self, non_empty};
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};

/// Client holding the credential, the config and a transport. The
/// credential is fixed for the lifetime of the client.
pub struct GistClient<T: Transport = HttpTransport> {
    transport: T,
    credential: Credential,
    config: Config,
}

impl GistClient<HttpTransport> {
    /// Client talking HTTP to `config.base_url`.
    pub fn new(credential: Credential, config: Config) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Self::with_transport(transport, credential, config)
    }

    /// Client configured from the environment, see `Config::from_env`.
    pub fn from_env(credential: Credential) -> Result<Self> {
        Self::new(credential, Config::from_env()?)
    }
}

impl<T: Transport> GistClient<T> {
    pub fn with_transport(transport: T, credential: Credential, config: Config) -> Result<Self> {
        if credential.is_empty() {
            return Err(GistError::InvalidArgument("auth token is empty".into()));
        }
        Ok(GistClient {
            transport,
            credential,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.transport.execute(&request, &self.credential)
    }

    fn send_json<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R> {
        let res = self.send(request)?.error_for_status()?;
        Ok(serde_json::from_str(&res.body)?)
    }

    /// Fetch a single listing page (1-based).
    pub fn page(&self, page: u32) -> Result<Vec<Gist>> {
        let request = ApiRequest::new(Method::Get, "gists")
            .query("page", page)
            .query("per_page", PER_PAGE);
        let res = self.send(request)?.error_for_status()?;

        let value: serde_json::Value =
            serde_json::from_str(&res.body).map_err(|_| GistError::Remote {
                status: res.status,
                body: res.body.clone(),
            })?;
        if !value.is_array() {
            return Err(GistError::Remote {
                status: res.status,
                body: res.body,
            });
        }
        let gists: Vec<Gist> = serde_json::from_value(value)?;
        log::debug!("Listing page {} returned {} gist(s)", page, gists.len());
        Ok(gists)
    }

    /// Lazy sequence of listing pages, ending at the first empty page.
    pub fn pages(&self) -> Pages<'_, T> {
        Pages {
            client: self,
            next: 1,
            done: false,
        }
    }

    /// Every gist visible to the credential. A failed page fails the whole
    /// listing; a truncated directory is never returned.
    pub fn list_all(&self) -> Result<Directory> {
        let mut directory = Directory::new();
        for page in self.pages() {
            directory.extend(page?);
        }
        log::debug!("Listed {} gist(s)", directory.len());
        Ok(directory)
    }

    /// Return `explicit_id` as is, or look `file_name` up in the remote
    /// directory. Only the name lookup touches the network.
    pub fn resolve_id(&self, explicit_id: Option<&str>, file_name: Option<&str>) -> Result<String> {
        if let Some(id) = non_empty(explicit_id) {
            return Ok(id.to_string());
        }
        let name = non_empty(file_name).ok_or_else(|| {
            GistError::InvalidArgument("either a gist id or a file name is required".into())
        })?;

        let directory = self.list_all()?;
        let resolution = resolve::resolve(None, Some(name), &directory)?;
        log::info!("Resolved {} -> {:?}", name, resolution);
        resolution.into_result(name)
    }

    fn bundle(&self, path: &Path, separator: Option<&str>) -> Result<FileBundle> {
        let separator = separator.unwrap_or(&self.config.separator);
        bundle::split_file(path, separator)
    }

    /// Create a new gist from `path`.
    pub fn create(&self, path: &Path, separator: Option<&str>) -> Result<Gist> {
        let bundle = self.bundle(path, separator)?;
        let request = ApiRequest::new(Method::Post, "gists").json(serde_json::to_value(&bundle)?);
        let gist: Gist = self.send_json(request)?;
        log::info!("Created gist {} from {}", gist.id, path.display());
        Ok(gist)
    }

    /// Replace the content of a gist with the current content of `path`.
    /// Without an explicit id, the gist is found by the file's base name.
    pub fn update(&self, path: &Path, explicit_id: Option<&str>) -> Result<Gist> {
        self.update_with(path, explicit_id, None)
    }

    /// `update` with a separator other than the configured one.
    pub fn update_with(
        &self,
        path: &Path,
        explicit_id: Option<&str>,
        separator: Option<&str>,
    ) -> Result<Gist> {
        let bundle = self.bundle(path, separator)?;
        let name = bundle::base_name(path)?;
        let id = self.resolve_id(explicit_id, Some(&name))?;

        let request = ApiRequest::new(Method::Patch, format!("gists/{id}"))
            .json(serde_json::to_value(&bundle)?);
        let gist: Gist = self.send_json(request)?;
        log::info!("Updated gist {} from {}", gist.id, path.display());
        Ok(gist)
    }

    /// Delete a gist by id, or by the name of a file it contains. Returns
    /// the status code of the delete call (204 on success).
    pub fn delete(&self, file_name: Option<&str>, explicit_id: Option<&str>) -> Result<u16> {
        let name = non_empty(file_name).map(|n| {
            Path::new(n)
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or(n)
                .to_string()
        });
        let id = self.resolve_id(explicit_id, name.as_deref())?;

        let res = self
            .send(ApiRequest::new(Method::Delete, format!("gists/{id}")))?
            .error_for_status()?;
        log::info!("Deleted gist {} ({})", id, res.status);
        Ok(res.status)
    }
}

/// Iterator over listing pages. Stops after the first empty page or the
/// first error.
pub struct Pages<'a, T: Transport> {
    client: &'a GistClient<T>,
    next: u32,
    done: bool,
}

impl<'a, T: Transport> Iterator for Pages<'a, T> {
    type Item = Result<Vec<Gist>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let page = self.client.page(self.next);
        self.next += 1;
        match page {
            Ok(gists) if gists.is_empty() => {
                self.done = true;
                None
            }
            Ok(gists) => Some(Ok(gists)),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{gist_json, MockTransport};
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn client() -> GistClient<MockTransport> {
        GistClient::with_transport(MockTransport::new(), Credential::new("s3cret"), Config::default())
            .unwrap()
    }

    fn write(dir: &TempDir, name: &str, text: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn empty_token_is_rejected() {
        let result =
            GistClient::with_transport(MockTransport::new(), Credential::new(""), Config::default());
        assert!(matches!(result, Err(GistError::InvalidArgument(_))));
    }

    #[test]
    fn pagination_stops_at_first_empty_page() {
        let client = client();
        client.transport().push_pages(&[100, 100, 37, 0]);

        let directory = client.list_all().unwrap();
        assert_eq!(directory.len(), 237);

        let requests = client.transport().requests();
        assert_eq!(requests.len(), 4);
        for (i, r) in requests.iter().enumerate() {
            assert_eq!(r.request.method, Method::Get);
            assert_eq!(r.request.path, "gists");
            assert_eq!(
                r.request.query,
                vec![
                    ("page".to_string(), (i + 1).to_string()),
                    ("per_page".to_string(), "100".to_string()),
                ]
            );
            assert_eq!(r.authorization, "token s3cret");
        }
        // ordering survives accumulation
        assert_eq!(directory[0].id, "id1");
        assert_eq!(directory[236].id, "id237");
    }

    #[test]
    fn empty_first_page_gives_empty_directory() {
        let client = client();
        client.transport().push_pages(&[0]);
        assert!(client.list_all().unwrap().is_empty());
        assert_eq!(client.transport().count(Method::Get), 1);
    }

    #[test]
    fn failed_page_fails_the_listing() {
        let client = client();
        client.transport().push_pages(&[100]);
        client.transport().push(502, "bad gateway");
        client.transport().push_pages(&[5]);

        let err = client.list_all().unwrap_err();
        assert_eq!(err.status(), Some(502));
        // nothing requested after the failure
        assert_eq!(client.transport().count(Method::Get), 2);
        assert_eq!(client.transport().remaining(), 1);
    }

    #[test]
    fn non_list_page_is_remote_error() {
        let client = client();
        client
            .transport()
            .push_json(200, json!({"message": "Bad credentials"}));
        let err = client.list_all().unwrap_err();
        assert!(matches!(err, GistError::Remote { status: 200, .. }));
    }

    #[test]
    fn timeout_is_distinct_from_remote_status() {
        let client = client();
        client
            .transport()
            .push_error(GistError::Timeout("30s elapsed".into()));
        let err = client.list_all().unwrap_err();
        assert!(matches!(err, GistError::Timeout(_)));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn explicit_id_skips_listing() {
        let client = client();
        assert_eq!(client.resolve_id(Some("abc"), Some("x.py")).unwrap(), "abc");
        assert!(client.transport().requests().is_empty());
    }

    #[test]
    fn resolve_by_name() {
        let client = client();
        client.transport().push_json(
            200,
            json!([gist_json("g1", &["a.py"]), gist_json("g2", &["b.py"])]),
        );
        client.transport().push_pages(&[0]);
        assert_eq!(client.resolve_id(None, Some("b.py")).unwrap(), "g2");
    }

    #[test]
    fn resolve_without_arguments_does_not_list() {
        let client = client();
        let err = client.resolve_id(None, None).unwrap_err();
        assert!(matches!(err, GistError::InvalidArgument(_)));
        assert!(client.transport().requests().is_empty());
    }

    #[test]
    fn create_posts_single_file_bundle() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "sample.py", "print('hello')\n");

        let client = client();
        client.transport().push_json(
            201,
            json!({
                "id": "new123",
                "files": {"sample.py": {"filename": "sample.py", "content": "print('hello')\n"}},
                "created_at": "2024-01-01T00:00:00Z"
            }),
        );

        let gist = client.create(&path, None).unwrap();
        assert_eq!(gist.id, "new123");

        let requests = client.transport().requests();
        assert_eq!(requests.len(), 1);
        let sent = &requests[0].request;
        assert_eq!(sent.method, Method::Post);
        assert_eq!(sent.path, "gists");
        assert_eq!(
            sent.body,
            Some(json!({
                "public": true,
                "files": {"sample.py": {"content": "print('hello')\n"}}
            }))
        );
    }

    #[test]
    fn create_with_custom_separator() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "nb.py", "a\n# ---\nb\n");

        let client = client();
        client
            .transport()
            .push_json(201, gist_json("n1", &["nb.py", "nb_1.py"]));
        client.create(&path, Some("# ---")).unwrap();

        let body = client.transport().requests()[0].request.body.clone().unwrap();
        assert_eq!(body["files"]["nb.py"]["content"], "a\n");
        assert_eq!(body["files"]["nb_1.py"]["content"], "b\n");
    }

    #[test]
    fn create_missing_file_never_hits_the_network() {
        let dir = TempDir::new().unwrap();
        let client = client();
        let err = client.create(&dir.path().join("nope.py"), None).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(client.transport().requests().is_empty());
    }

    #[test]
    fn create_surfaces_service_error_body() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.py", "x\n");
        let client = client();
        client
            .transport()
            .push(422, r#"{"message":"Validation Failed"}"#);
        let err = client.create(&path, None).unwrap_err();
        match err {
            GistError::Remote { status, body } => {
                assert_eq!(status, 422);
                assert!(body.contains("Validation Failed"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn update_by_name_patches_resolved_id() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "sample.py", "v2\n#%%\nmore\n");

        let client = client();
        client.transport().push_json(
            200,
            json!([gist_json("other", &["x.py"]), gist_json("target", &["sample.py"])]),
        );
        client.transport().push_pages(&[0]);
        client.transport().push_json(
            200,
            json!({
                "id": "target",
                "files": {"sample.py": {}, "sample_1.py": {}},
                "created_at": "2024-01-01T00:00:00Z",
                "updated_at": "2024-01-02T00:00:00Z"
            }),
        );

        let gist = client.update(&path, None).unwrap();
        assert_eq!(gist.id, "target");
        assert!(gist.updated_at > gist.created_at);

        let requests = client.transport().requests();
        assert_eq!(requests.len(), 3);
        let patch = &requests[2].request;
        assert_eq!(patch.method, Method::Patch);
        assert_eq!(patch.path, "gists/target");
        let body = patch.body.clone().unwrap();
        assert_eq!(body["files"]["sample.py"]["content"], "v2\n");
        assert_eq!(body["files"]["sample_1.py"]["content"], "more\n");
    }

    #[test]
    fn update_with_id_skips_listing() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "renamed.py", "x\n");

        let client = client();
        client
            .transport()
            .push_json(200, gist_json("abc", &["renamed.py"]));
        client.update(&path, Some("abc")).unwrap();

        let requests = client.transport().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].request.path, "gists/abc");
        assert_eq!(client.transport().count(Method::Get), 0);
    }

    #[test]
    fn update_ambiguous_name_sends_nothing() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "sample.py", "x\n");

        let client = client();
        client.transport().push_json(
            200,
            json!([gist_json("g1", &["sample.py"]), gist_json("g2", &["sample.py"])]),
        );
        client.transport().push_pages(&[0]);

        let err = client.update(&path, None).unwrap_err();
        assert_eq!(err.conflicting_ids(), ["g1", "g2"]);
        assert_eq!(client.transport().count(Method::Patch), 0);
    }

    #[test]
    fn update_unknown_name_is_not_found() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "fresh.py", "x\n");

        let client = client();
        client.transport().push_pages(&[3, 0]);
        let err = client.update(&path, None).unwrap_err();
        assert!(matches!(err, GistError::NotFound { file_name } if file_name == "fresh.py"));
    }

    #[test]
    fn delete_by_id_skips_listing() {
        let client = client();
        client.transport().push(204, "");
        assert_eq!(client.delete(None, Some("abc")).unwrap(), 204);

        let requests = client.transport().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].request.method, Method::Delete);
        assert_eq!(requests[0].request.path, "gists/abc");
    }

    #[test]
    fn delete_by_name_lists_once_then_deletes() {
        let client = client();
        client
            .transport()
            .push_json(200, json!([gist_json("g9", &["sample.py"])]));
        client.transport().push_pages(&[0]);
        client.transport().push(204, "");

        assert_eq!(client.delete(Some("sample.py"), None).unwrap(), 204);
        // one listing (two pages) and one delete
        assert_eq!(client.transport().count(Method::Get), 2);
        assert_eq!(client.transport().count(Method::Delete), 1);
        assert_eq!(client.transport().requests()[2].request.path, "gists/g9");
    }

    #[test]
    fn delete_by_path_uses_base_name() {
        let client = client();
        client
            .transport()
            .push_json(200, json!([gist_json("g9", &["sample.py"])]));
        client.transport().push_pages(&[0]);
        client.transport().push(204, "");
        assert_eq!(client.delete(Some("some/dir/sample.py"), None).unwrap(), 204);
    }

    #[test]
    fn delete_without_target_is_rejected() {
        let client = client();
        let err = client.delete(None, None).unwrap_err();
        assert!(matches!(err, GistError::InvalidArgument(_)));
        assert!(client.transport().requests().is_empty());
    }

    #[test]
    fn delete_missing_gist_reports_status() {
        let client = client();
        client.transport().push(404, r#"{"message":"Not Found"}"#);
        let err = client.delete(None, Some("gone")).unwrap_err();
        assert_eq!(err.status(), Some(404));
    }
}
