//! Build-and-publish pipeline
//!
//! probe → dockerfile → platform check → image reference → build arguments
//! → primary repository → registry logins → build → unit test → healthcheck
//! → push. Every stage returns a `Result`; registry sessions opened along the
//! way are closed by [`cleanup::logout_all`] whatever the outcome.

use crate::cleanup;
use crate::error::PipelineError;
use anyhow::Context;
use shipyard_build::{
    BuildArgsAssembler, BuildOptions, CapabilityProbe, DockerfileDirectives, ImageBuilder,
    ImagePusher, read_dockerfile,
};
use shipyard_config::{ConfigError, GitHubContext, ImageReference, Inputs};
use shipyard_container::{
    DockerCli, HealthProbe, HealthcheckSupervisor, HttpProbe, UnitTestSupervisor,
};
use shipyard_core::{ActionsMasker, CommandRunner, ProcessRunner, SecretMasker, workflow};
use shipyard_registry::{
    EcrClientFactory, RegistryClientFactory, RegistryCredential, RegistryLogins,
    ensure_repository, region_from_host,
};
use std::path::PathBuf;
use std::sync::Arc;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// External collaborators of a run.
#[derive(Clone)]
pub struct Services {
    pub runner: Arc<dyn CommandRunner>,
    pub masker: Arc<dyn SecretMasker>,
    pub factory: Arc<dyn RegistryClientFactory>,
    pub probe: Arc<dyn HealthProbe>,
}

impl Services {
    /// Real processes, Actions masking, ECR and HTTP.
    pub fn live() -> anyhow::Result<Self> {
        let probe = HttpProbe::new().context("failed to create the healthcheck HTTP client")?;
        Ok(Self {
            runner: Arc::new(ProcessRunner::new()),
            masker: Arc::new(ActionsMasker),
            factory: Arc::new(EcrClientFactory),
            probe: Arc::new(probe),
        })
    }
}

pub struct Pipeline {
    inputs: Inputs,
    ctx: GitHubContext,
    services: Services,
    docker: DockerCli,
}

impl Pipeline {
    pub fn new(inputs: Inputs, ctx: GitHubContext, services: Services) -> Self {
        let docker = DockerCli::new(services.runner.clone());
        Self {
            inputs,
            ctx,
            services,
            docker,
        }
    }

    /// Run every stage, then log out of every host that was logged in to.
    pub async fn run(&self) -> Result<()> {
        let mut hosts = Vec::new();
        let result = self.execute(&mut hosts).await;
        cleanup::logout_all(&self.docker, &hosts).await;
        result
    }

    async fn execute(&self, hosts: &mut Vec<String>) -> Result<()> {
        self.inputs.validate()?;
        let port = self.inputs.port()?;
        self.services.masker.mask(&self.inputs.secret_access_key);
        if let Some(key) = self.inputs.github_ssh_key() {
            self.services.masker.mask(key);
        }

        let capabilities = CapabilityProbe::new(self.docker.clone()).probe().await?;

        let workdir = PathBuf::from(self.inputs.working_directory());
        let dockerfile = read_dockerfile(&workdir, self.inputs.dockerfile()).await?;
        let directives = DockerfileDirectives::scan(&dockerfile);
        tracing::debug!("Dockerfile directives: {:?}", directives);

        capabilities.check_platform(self.inputs.platform())?;

        let image = ImageReference::from_inputs(&self.inputs, &self.ctx)?;
        tracing::info!("Image: {}", image.base());

        let mut plan = BuildArgsAssembler::new(self.services.runner.clone())
            .assemble(
                &image,
                &BuildOptions::from_inputs(&self.inputs),
                &directives,
                &capabilities,
            )
            .await?;

        let repo_name = self.ctx.repo_name();
        let registry_error = |e| PipelineError::registry(e, repo_name);

        let credential = RegistryCredential::new(
            self.inputs.access_key_id.trim(),
            self.inputs.secret_access_key.trim(),
        );
        let primary = self
            .services
            .factory
            .connect(&credential, region_from_host(&image.registry))
            .await
            .map_err(registry_error)?;
        ensure_repository(primary.as_ref(), &image.repository)
            .await
            .map_err(registry_error)?;

        let logins = RegistryLogins {
            docker: &self.docker,
            masker: self.services.masker.as_ref(),
            factory: self.services.factory.as_ref(),
        };
        let mirror_args = logins
            .login_to_all(
                primary.as_ref(),
                &image.registry,
                &image,
                self.inputs.registries(),
                hosts,
            )
            .await
            .map_err(registry_error)?;
        plan.extend_args(mirror_args);
        if let Some(raw) = self.inputs.build_args() {
            plan.append_user_build_args(raw);
        }

        ImageBuilder::new(self.docker.clone())
            .build(&plan, &workdir)
            .await?;

        self.verify(&image, port).await?;

        if self.inputs.deploy {
            ImagePusher::new(self.docker.clone()).push(&image).await?;
        } else {
            tracing::info!("deploy is off, not pushing {}", image.base());
        }
        Ok(())
    }

    /// Unit test, then healthcheck, each against the sha tag.
    async fn verify(&self, image: &ImageReference, port: Option<u16>) -> Result<()> {
        let target = image.sha_tag();
        let env_file = self.inputs.env_file();

        match self.inputs.unit_test() {
            Some(command) => {
                let outcome = UnitTestSupervisor::new(self.docker.clone())
                    .run(&target, command, env_file)
                    .await?;
                if !outcome.passed() {
                    return Err(PipelineError::Verification {
                        stage: "Unit test",
                        outcome,
                    });
                }
            }
            None => workflow::warning("Not running unit tests"),
        }

        match (self.inputs.healthcheck(), port) {
            (Some(path), Some(port)) => {
                let outcome =
                    HealthcheckSupervisor::new(self.docker.clone(), self.services.probe.clone())
                        .run(&target, path, port, env_file)
                        .await?;
                if !outcome.passed() {
                    return Err(PipelineError::Verification {
                        stage: "Healthcheck",
                        outcome,
                    });
                }
            }
            (Some(path), None) => {
                return Err(ConfigError::HealthcheckWithoutPort(path.to_string()).into());
            }
            (None, _) => workflow::warning("No healthcheck specified"),
        }
        Ok(())
    }
}
