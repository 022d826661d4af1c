/// Instruction sent alongside the image. The JSON example doubles as the schema.
pub const PERCEPTION_PROMPT: &str = r#"
Act as a Computational Brain Simulation (Active Inference Engine).
Analyze the input image.

1. **Feature Extraction (Bottom-Up)**:
   - Generate a 4D feature vector [Complexity, Brightness, Motion, Familiarity] (0.0-1.0).
   - Identify V1 features (edges, contrast) and IT object recognition.

2. **Prediction Generation (Top-Down)**:
   - Based on standard priors, what did you expect?
   - Generate a "Predicted Vector" representing this expectation.

3. **Motor Cortex Planning**:
   - Determine the single most logical physical response based on the belief state.
   - Format: "Action description" (e.g., "Grasp object", "Scan face", "Recoil").

4. **Conscious Narrative (First-Person)**:
   - STRICT FORMAT: 3-4 sentences max.
   - Mention: Bottom-up input, Top-down prior, Surprise level, and Motor readiness.

Return JSON:
{
  "sensoryVector": [0.8, 0.9, 0.1, 0.5],
  "predictionVector": [0.7, 0.9, 0.0, 0.6],
  "v1": { "edges": "Sharp/High-Freq", "contrast": 0.9, "motion": "Static" },
  "it": { "objectLabel": "Coffee Mug", "category": "Artifact", "confidence": 0.95 },
  "pfc": { "prediction": "Expect office stationary object", "context": "Work environment" },
  "motor": { "action": "Reach and Grasp", "target": "Handle", "confidence": 0.88, "reasoning": "Object affords grasping" },
  "activations": { "v1": 85, "it": 92, "pfc": 60, "motor": 45 },
  "narrative": "Received bottom-up stream: distinct shape with high contrast. Top-down prior predicted office context. Low surprise (0.12). Motor Cortex preparing grasp action."
}
"#;
