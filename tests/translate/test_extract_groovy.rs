use pipeshift::core::document::RawDocument;
use pipeshift::core::extract;
use pipeshift::core::types::{ConstructKind, Dialect};

const JENKINSFILE: &str = r#"pipeline {
    agent any
    triggers {
        cron('H 4 * * 1')
    }
    environment {
        CI = 'true'
        APP_NAME = 'widget'
    }
    stages {
        stage('Build') {
            steps {
                checkout scm
                sh 'make build'
            }
        }
        stage('Deploy') {
            when {
                branch 'main'
            }
            environment {
                TARGET = 'production'
            }
            steps {
                withCredentials([string(credentialsId: 'deploy-key', variable: 'KEY')]) {
                    sh './deploy.sh'
                }
                archiveArtifacts artifacts: 'dist/**'
            }
        }
    }
}
"#;

fn doc(text: &str) -> RawDocument {
    RawDocument::new(text, Dialect::GroovyPipeline)
}

fn kinds_of(text: &str) -> Vec<ConstructKind> {
    let (constructs, _) = extract::extract(&doc(text));
    constructs.iter().map(|c| c.kind).collect()
}

#[test]
fn test_stages_become_jobs() {
    let (constructs, _) = extract::extract(&doc(JENKINSFILE));
    let jobs: Vec<_> = constructs
        .iter()
        .filter(|c| c.kind == ConstructKind::Job)
        .collect();
    let names: Vec<_> = jobs.iter().filter_map(|j| j.identifier.as_deref()).collect();
    assert_eq!(names, vec!["Build", "Deploy"]);
}

#[test]
fn test_cron_trigger_extracted() {
    let (constructs, _) = extract::extract(&doc(JENKINSFILE));
    let trigger = constructs
        .iter()
        .find(|c| c.kind == ConstructKind::Trigger)
        .expect("cron trigger");
    assert_eq!(trigger.identifier.as_deref(), Some("cron"));
    assert_eq!(trigger.attr("spec"), Some("H 4 * * 1"));
}

#[test]
fn test_pipeline_environment_extracted() {
    let (constructs, _) = extract::extract(&doc(JENKINSFILE));
    let global_env = constructs
        .iter()
        .find(|c| c.kind == ConstructKind::EnvBlock && c.parent().is_none())
        .expect("pipeline environment");
    assert_eq!(global_env.attr("CI"), Some("true"));
    assert_eq!(global_env.attr("APP_NAME"), Some("widget"));

    let stage_env = constructs
        .iter()
        .find(|c| c.kind == ConstructKind::EnvBlock && c.parent() == Some("Deploy"))
        .expect("stage environment");
    assert_eq!(stage_env.attr("TARGET"), Some("production"));
}

#[test]
fn test_steps_attached_to_their_stage() {
    let (constructs, _) = extract::extract(&doc(JENKINSFILE));
    let build_steps: Vec<_> = constructs
        .iter()
        .filter(|c| c.kind == ConstructKind::Step && c.parent() == Some("Build"))
        .collect();
    assert_eq!(build_steps.len(), 2);
    assert_eq!(build_steps[0].identifier.as_deref(), Some("checkout"));
    assert_eq!(build_steps[1].identifier.as_deref(), Some("sh"));
    assert_eq!(build_steps[1].attr("command"), Some("make build"));
}

#[test]
fn test_when_branch_becomes_conditional() {
    let (constructs, _) = extract::extract(&doc(JENKINSFILE));
    let conditional = constructs
        .iter()
        .find(|c| c.kind == ConstructKind::Conditional)
        .expect("when block");
    assert_eq!(conditional.parent(), Some("Deploy"));
    assert_eq!(conditional.attr("branch"), Some("main"));
}

#[test]
fn test_credentials_and_artifacts_extracted() {
    let (constructs, _) = extract::extract(&doc(JENKINSFILE));
    let credential = constructs
        .iter()
        .find(|c| c.kind == ConstructKind::Credential)
        .expect("withCredentials");
    assert_eq!(credential.parent(), Some("Deploy"));

    let artifact = constructs
        .iter()
        .find(|c| c.kind == ConstructKind::Artifact)
        .expect("archiveArtifacts");
    assert_eq!(artifact.attr("artifacts"), Some("dist/**"));
}

#[test]
fn test_agent_surfaces_as_other() {
    let (constructs, _) = extract::extract(&doc(JENKINSFILE));
    let agent = constructs
        .iter()
        .find(|c| c.identifier.as_deref() == Some("agent"))
        .expect("pipeline agent");
    assert_eq!(agent.kind, ConstructKind::Other);
    assert_eq!(agent.attr("agent"), Some("any"));
}

#[test]
fn test_stage_agent_is_not_promoted_to_pipeline_agent() {
    let text = r#"pipeline {
    stages {
        stage('Build') {
            agent any
            steps {
                sh 'make'
            }
        }
    }
}
"#;
    let (constructs, _) = extract::extract(&doc(text));
    assert!(!constructs
        .iter()
        .any(|c| c.identifier.as_deref() == Some("agent")));
    let job = constructs
        .iter()
        .find(|c| c.kind == ConstructKind::Job)
        .expect("stage job");
    assert_eq!(job.attr("agent"), Some("any"));
}

#[test]
fn test_constructs_sorted_by_source_position() {
    let (constructs, _) = extract::extract(&doc(JENKINSFILE));
    let starts: Vec<usize> = constructs.iter().map(|c| c.span.start).collect();
    let mut sorted = starts.clone();
    sorted.sort_unstable();
    assert_eq!(starts, sorted);
}

#[test]
fn test_matrix_axes_extracted() {
    let text = r#"pipeline {
    stages {
        stage('Test') {
            matrix {
                axes {
                    axis {
                        name 'PLATFORM'
                        values 'linux', 'macos'
                    }
                }
            }
        }
    }
}
"#;
    let (constructs, _) = extract::extract(&doc(text));
    let matrix = constructs
        .iter()
        .find(|c| c.kind == ConstructKind::Matrix)
        .expect("matrix");
    assert_eq!(matrix.parent(), Some("Test"));
    assert_eq!(matrix.attr("PLATFORM"), Some("linux, macos"));
}

#[test]
fn test_document_without_pipeline_block_degrades() {
    let (constructs, diagnostics) = extract::extract(&doc("println 'not a pipeline'\n"));
    assert_eq!(kinds_of("println 'not a pipeline'\n"), vec![ConstructKind::Other]);
    assert_eq!(constructs.len(), 1);
    assert!(diagnostics
        .iter()
        .any(|d| d.code == extract::EXTRACTION_DEGRADED));
}

#[test]
fn test_stage_without_steps_is_reported() {
    let text = "pipeline {\n  stages {\n    stage('Empty') {\n    }\n  }\n}\n";
    let (constructs, diagnostics) = extract::extract(&doc(text));
    assert!(constructs.iter().any(|c| c.kind == ConstructKind::Job));
    assert!(diagnostics.iter().any(|d| d.message.contains("Empty")));
}
